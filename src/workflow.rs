use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::device::resolve_device_settings;
use crate::error::{Result, SubgenError};
use crate::media::{is_video_file, AudioTrack, MediaProcessorFactory, MediaProcessorTrait};
use crate::source::Resolver;
use crate::transcribe::{TranscriberFactory, TranscriberTrait, TranscriptionOutcome};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub transcribed: usize,
    pub skipped: usize,
}

pub struct Workflow {
    media: Arc<dyn MediaProcessorTrait>,
    resolver: Resolver,
    transcriber: Box<dyn TranscriberTrait>,
}

impl Workflow {
    /// Build the workflow, detecting the transcription device if it was left unset
    pub async fn new(mut config: Config) -> Result<Self> {
        resolve_device_settings(&mut config.transcriber).await;

        let media: Arc<dyn MediaProcessorTrait> =
            Arc::from(MediaProcessorFactory::create_processor(config.media.clone()));
        match media.get_version_info().await {
            Ok(version) => debug!("Using {}", version),
            Err(e) => warn!("ffmpeg is not available, video inputs will fail: {}", e),
        }

        let resolver = Resolver::new(&config, Arc::clone(&media));
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());

        Ok(Self::from_parts(media, resolver, transcriber))
    }

    pub fn from_parts(
        media: Arc<dyn MediaProcessorTrait>,
        resolver: Resolver,
        transcriber: Box<dyn TranscriberTrait>,
    ) -> Self {
        Self {
            media,
            resolver,
            transcriber,
        }
    }

    /// Resolve every location to audio files, then transcribe them one by one.
    /// Stops at the first failing transcription.
    pub async fn run(&self, locations: &[String]) -> Result<RunSummary> {
        let audio_files = self.collect_audio_files(locations).await?;
        if audio_files.is_empty() {
            return Err(SubgenError::NoMediaFound);
        }

        self.transcriber.check_availability().await?;

        info!("Transcribing {} audio file(s)", audio_files.len());
        let mut summary = RunSummary::default();

        for (index, audio_path) in audio_files.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, audio_files.len(), audio_path.display());

            match self.transcriber.transcribe(audio_path).await? {
                TranscriptionOutcome::Transcribed(_) => summary.transcribed += 1,
                TranscriptionOutcome::UpToDate(_) => summary.skipped += 1,
            }
        }

        info!(
            "Finished: {} transcribed, {} up-to-date",
            summary.transcribed, summary.skipped
        );
        Ok(summary)
    }

    async fn collect_audio_files(&self, locations: &[String]) -> Result<Vec<PathBuf>> {
        let mut audio_files: Vec<PathBuf> = Vec::new();

        for location in locations {
            match self.resolver.resolve(location).await? {
                Some(paths) => {
                    for path in paths {
                        if !audio_files.contains(&path) {
                            audio_files.push(path);
                        }
                    }
                }
                None => warn!(
                    "Could not handle location: {}. Please ensure it is a valid audio/video file or directory containing such files.",
                    location
                ),
            }
        }

        Ok(audio_files)
    }

    /// Audio tracks of each video location, in argument order
    pub async fn list_audio_tracks(&self, locations: &[String]) -> Result<Vec<(PathBuf, Vec<AudioTrack>)>> {
        self.media.check_availability().await?;
        let mut listings = Vec::new();

        for location in locations {
            let path = Path::new(location);
            if !is_video_file(path) {
                warn!("Skipping {}: not a video file", location);
                continue;
            }

            let tracks = self.media.probe_audio_tracks(path).await?;
            listings.push((path.to_path_buf(), tracks));
        }

        Ok(listings)
    }
}
