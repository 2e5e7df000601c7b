// Sources turn a command-line location into audio files ready for transcription
//
// - Local: audio files, video files (converted to mp3) and directories
// - YouTube: URLs downloaded with yt-dlp
//
// A source either produces an audio file, expands the location into further
// locations, or declines so the next source gets a chance.

pub mod local;
pub mod youtube;

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

pub use local::*;
pub use youtube::*;

use crate::config::Config;
use crate::error::Result;
use crate::media::MediaProcessorTrait;

/// What a source made of a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// A single audio file ready for transcription
    Audio(PathBuf),
    /// Further locations to resolve
    Locations(Vec<String>),
    /// The source could not handle the location
    Unhandled,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;

    /// Check if the source can handle the given location
    fn can_handle(&self, location: &str) -> bool;

    async fn handle(&self, location: &str) -> Result<SourceOutcome>;
}

/// Resolves locations to audio files by trying each source in order
pub struct Resolver {
    sources: Vec<Box<dyn Source>>,
}

impl Resolver {
    /// Standard source chain: audio, video, YouTube, directory
    pub fn new(config: &Config, media: Arc<dyn MediaProcessorTrait>) -> Self {
        let downloader = YtDlpDownloader::new(
            config.youtube.clone(),
            config.transcriber.language.clone(),
        );

        Self::with_sources(vec![
            Box::new(AudioSource),
            Box::new(VideoSource::new(media, config.media.audio_track)),
            Box::new(YoutubeSource::new(Box::new(downloader), config.youtube.download_video)),
            Box::new(DirectorySource),
        ])
    }

    pub fn with_sources(sources: Vec<Box<dyn Source>>) -> Self {
        Self { sources }
    }

    /// Resolve a location breadth-first into de-duplicated audio paths.
    /// Returns `None` when nothing usable was found.
    pub async fn resolve(&self, location: &str) -> Result<Option<Vec<PathBuf>>> {
        let mut results: Vec<PathBuf> = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([location.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }

            match self.resolve_single(&current).await? {
                SourceOutcome::Audio(path) => {
                    if !results.contains(&path) {
                        results.push(path);
                    }
                }
                SourceOutcome::Locations(locations) => queue.extend(locations),
                SourceOutcome::Unhandled => {
                    if current != location {
                        warn!("Skipping {}: not an audio or video file", current);
                    }
                }
            }
        }

        Ok(if results.is_empty() { None } else { Some(results) })
    }

    async fn resolve_single(&self, location: &str) -> Result<SourceOutcome> {
        for source in &self.sources {
            if !source.can_handle(location) {
                continue;
            }

            debug!("{} source handling {}", source.name(), location);
            match source.handle(location).await? {
                SourceOutcome::Unhandled => continue,
                outcome => return Ok(outcome),
            }
        }

        Ok(SourceOutcome::Unhandled)
    }
}
