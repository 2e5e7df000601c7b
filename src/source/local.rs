use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{Source, SourceOutcome};
use crate::error::Result;
use crate::freshness::is_up_to_date;
use crate::media::{is_audio_file, is_video_file, MediaKind, MediaProcessorTrait};
use crate::progress::spinner;

/// Audio files are used as they are
pub struct AudioSource;

#[async_trait]
impl Source for AudioSource {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn can_handle(&self, location: &str) -> bool {
        is_audio_file(Path::new(location))
    }

    async fn handle(&self, location: &str) -> Result<SourceOutcome> {
        info!("Existing audio file: {}", location);
        Ok(SourceOutcome::Audio(PathBuf::from(location)))
    }
}

/// Video files are converted to an mp3 next to the video
pub struct VideoSource {
    media: Arc<dyn MediaProcessorTrait>,
    audio_track: Option<u32>,
}

impl VideoSource {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, audio_track: Option<u32>) -> Self {
        Self { media, audio_track }
    }

    /// `movie.mkv` becomes `movie.mp3`, or `movie.track2.mp3` when a track is selected
    pub fn audio_path_for(video_path: &Path, audio_track: Option<u32>) -> PathBuf {
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file_name = match audio_track {
            Some(track) => format!("{}.track{}.mp3", stem, track),
            None => format!("{}.mp3", stem),
        };
        video_path.with_file_name(file_name)
    }
}

#[async_trait]
impl Source for VideoSource {
    fn name(&self) -> &'static str {
        "video"
    }

    fn can_handle(&self, location: &str) -> bool {
        is_video_file(Path::new(location))
    }

    async fn handle(&self, location: &str) -> Result<SourceOutcome> {
        let video_path = Path::new(location);
        let audio_path = Self::audio_path_for(video_path, self.audio_track);

        if is_up_to_date(&audio_path, video_path) {
            info!("Existing associated audio file: {}", audio_path.display());
            return Ok(SourceOutcome::Audio(audio_path));
        }

        let pb = spinner(format!("Converting {} to mp3", video_path.display()));
        let result = self
            .media
            .extract_audio(video_path, &audio_path, self.audio_track)
            .await;
        pb.finish_and_clear();
        result?;

        Ok(SourceOutcome::Audio(audio_path))
    }
}

/// Directories expand into every audio and video file below them
pub struct DirectorySource;

#[async_trait]
impl Source for DirectorySource {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn can_handle(&self, location: &str) -> bool {
        Path::new(location).is_dir()
    }

    async fn handle(&self, location: &str) -> Result<SourceOutcome> {
        let mut locations = Vec::new();

        for entry in WalkDir::new(location).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", location, e);
                    continue;
                }
            };

            // With follow_links the file type is the symlink target's
            if !entry.file_type().is_file() || MediaKind::from_extension(entry.path()).is_none() {
                continue;
            }

            match entry.path().to_str() {
                Some(path) => locations.push(path.to_string()),
                None => warn!("Skipping non UTF-8 path: {}", entry.path().display()),
            }
        }

        info!("Found {} media files in {}", locations.len(), location);
        Ok(SourceOutcome::Locations(locations))
    }
}
