// Transcription through an external speech-recognition CLI
//
// The transcriber only builds the command line and relays the tool's output;
// the subtitle files are written by the external program itself.

pub mod whisperx;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use whisperx::*;

use crate::config::TranscriberConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutcome {
    /// The transcriber ran and wrote this file
    Transcribed(PathBuf),
    /// The existing file is newer than the audio and was kept
    UpToDate(PathBuf),
}

impl TranscriptionOutcome {
    pub fn output_path(&self) -> &Path {
        match self {
            TranscriptionOutcome::Transcribed(path) | TranscriptionOutcome::UpToDate(path) => path,
        }
    }
}

/// Main trait for transcription operations
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Subtitle file the transcriber writes for an audio file
    fn output_path(&self, audio_path: &Path) -> Result<PathBuf>;

    /// Fail early when the transcriber command cannot be run
    async fn check_availability(&self) -> Result<()>;

    /// Transcribe an audio file unless its subtitle file is up to date
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionOutcome>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_default(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        Box::new(WhisperXTranscriber::new(config))
    }
}
