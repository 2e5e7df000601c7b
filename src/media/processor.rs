use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::{AudioTrack, MediaCommandBuilder, MediaProcessorTrait};
use crate::config::MediaConfig;
use crate::error::{Result, SubgenError};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Parse `ffprobe -select_streams a -of json` output into audio tracks.
/// Streams are numbered in order, matching ffmpeg's `0:a:<n>` selector.
pub fn parse_audio_tracks(json: &str) -> Result<Vec<AudioTrack>> {
    let probe: ProbeOutput = serde_json::from_str(json)?;

    Ok(probe
        .streams
        .into_iter()
        .enumerate()
        .map(|(index, stream)| AudioTrack {
            index: index as u32,
            codec: stream.codec_name,
            language: stream.tags.get("language").cloned(),
            channels: stream.channels,
            title: stream.tags.get("title").cloned(),
        })
        .collect())
}

/// FFmpeg-backed media processor
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for FfmpegProcessor {
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        audio_track: Option<u32>,
    ) -> Result<()> {
        info!("Converting {} to mp3...", video_path.display());

        let command = self.command_builder.extract_mp3(
            video_path,
            audio_path,
            audio_track,
            &self.config.audio_bitrate,
        );
        command.execute().await?;

        info!("Audio extraction completed: {}", audio_path.display());
        Ok(())
    }

    async fn probe_audio_tracks(&self, path: &Path) -> Result<Vec<AudioTrack>> {
        debug!("Probing audio tracks of {}", path.display());

        let stdout = self.command_builder.probe_audio_streams(path).execute().await?;
        parse_audio_tracks(&stdout)
    }

    /// Both ffmpeg and ffprobe must run
    async fn check_availability(&self) -> Result<()> {
        let checks = [
            (&self.config.ffmpeg_path, self.command_builder.version_check()),
            (&self.config.ffprobe_path, self.command_builder.probe_version_check()),
        ];
        for (binary, command) in checks {
            command
                .execute()
                .await
                .map_err(|e| SubgenError::Media(format!("{} not found: {}", binary, e)))?;
        }

        info!("Media processor is available");
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        let first_line = stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}
