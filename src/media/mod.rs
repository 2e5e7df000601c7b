// Media handling built on the ffmpeg/ffprobe command line tools
//
// - Commands: argv builders for ffmpeg and ffprobe invocations
// - Processor: the ffmpeg-backed implementation of MediaProcessorTrait

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "flac", "aac", "ogg", "opus"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "flv", "webm"];
const YOUTUBE_PATTERNS: &[&str] = &["youtube.com/watch", "youtu.be", "youtube.com/shorts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classify a path by its extension alone, case-insensitively
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Classify an existing regular file
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.is_file() {
            Self::from_extension(path)
        } else {
            None
        }
    }
}

pub fn is_audio_file(path: &Path) -> bool {
    MediaKind::from_path(path) == Some(MediaKind::Audio)
}

pub fn is_video_file(path: &Path) -> bool {
    MediaKind::from_path(path) == Some(MediaKind::Video)
}

pub fn is_media_file(path: &Path) -> bool {
    MediaKind::from_path(path).is_some()
}

pub fn is_youtube_url(location: &str) -> bool {
    YOUTUBE_PATTERNS.iter().any(|pattern| location.contains(pattern))
}

/// One audio stream of a media file as reported by ffprobe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Position among the audio streams, as used by `-map 0:a:<index>`
    pub index: u32,
    pub codec: Option<String>,
    pub language: Option<String>,
    pub channels: Option<u32>,
    pub title: Option<String>,
}

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Convert the audio of a video file to MP3, optionally picking one audio track
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        audio_track: Option<u32>,
    ) -> Result<()>;

    /// List the audio tracks of a media file
    async fn probe_audio_tracks(&self, path: &Path) -> Result<Vec<AudioTrack>>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
