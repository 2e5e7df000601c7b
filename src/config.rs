use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::Args;
use crate::error::{Result, SubgenError};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "subgenx.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub media: MediaConfig,
    pub youtube: YoutubeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Command prefix used to run WhisperX (e.g. `["uvx", "whisperx"]`)
    pub command: Vec<String>,
    /// WhisperX model name
    pub model: String,
    /// Subtitle format written by WhisperX
    pub output_format: OutputFormat,
    /// Language of the audio; auto-detected when unset
    pub language: Option<String>,
    /// Device to run on; detected when unset
    pub device: Option<String>,
    /// Compute type; derived from the device when unset
    pub compute_type: Option<String>,
    /// Directory for subtitle files; defaults to the audio file's directory
    pub output_dir: Option<PathBuf>,
    /// Transcribe even when the subtitle file is up to date
    pub force: bool,
    pub batch_size: Option<u32>,
    pub threads: Option<u32>,
    pub chunk_size: Option<u32>,
    pub model_dir: Option<PathBuf>,
    pub highlight_words: bool,
    pub max_line_width: Option<u32>,
    pub max_line_count: Option<u32>,
    /// Additional arguments passed verbatim before the input file
    pub extra_args: Vec<String>,
    /// Binary probed to detect a CUDA device
    pub gpu_probe: String,
}

/// Subtitle formats accepted by WhisperX's `--output_format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Txt,
    Vtt,
    #[default]
    Srt,
    Tsv,
    Json,
    Aud,
    /// Every format at once
    All,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Srt => "srt",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Aud => "aud",
            OutputFormat::All => "all",
        }
    }

    /// Extension of the file used to decide whether a transcription is up to date.
    /// `all` writes every format, the srt file stands in for the set.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::All => "srt",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// MP3 bitrate used when converting video audio
    pub audio_bitrate: String,
    /// Audio track of video files (0 is the first audio track)
    pub audio_track: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Path to yt-dlp binary
    pub binary_path: String,
    /// Directory downloads are written to
    pub download_dir: PathBuf,
    /// yt-dlp output template
    pub output_template: String,
    /// Audio quality passed to `--audio-quality`
    pub audio_quality: String,
    /// Download the full video instead of audio only
    pub download_video: bool,
    /// Also download the subtitles published on YouTube
    pub download_subtitles: bool,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            command: vec!["whisperx".to_string()],
            model: "small".to_string(),
            output_format: OutputFormat::Srt,
            language: None,
            device: None,
            compute_type: None,
            output_dir: None,
            force: false,
            batch_size: None,
            threads: None,
            chunk_size: None,
            model_dir: None,
            highlight_words: false,
            max_line_width: None,
            max_line_count: None,
            extra_args: Vec::new(),
            gpu_probe: "nvidia-smi".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            audio_bitrate: "192k".to_string(),
            audio_track: None,
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            download_dir: PathBuf::from("."),
            output_template: "%(title)s.%(ext)s".to_string(),
            audio_quality: "192K".to_string(),
            download_video: false,
            download_subtitles: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubgenError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit config file, else `subgenx.toml` from the working
    /// directory, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                    Self::from_file(DEFAULT_CONFIG_FILE)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_string()?;

        std::fs::write(path, content)
            .map_err(|e| SubgenError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SubgenError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Override file values with flags given on the command line
    pub fn apply_args(&mut self, args: &Args) {
        let transcriber = &mut self.transcriber;
        if let Some(model) = &args.model {
            transcriber.model = model.clone();
        }
        if let Some(format) = args.output_format {
            transcriber.output_format = format;
        }
        if args.language.is_some() {
            transcriber.language = args.language.clone();
        }
        if args.device.is_some() {
            transcriber.device = args.device.clone();
        }
        if args.compute_type.is_some() {
            transcriber.compute_type = args.compute_type.clone();
        }
        if args.output_dir.is_some() {
            transcriber.output_dir = args.output_dir.clone();
        }
        transcriber.force |= args.force;

        if args.audio_track.is_some() {
            self.media.audio_track = args.audio_track;
        }

        self.youtube.download_video |= args.yt_video;
        self.youtube.download_subtitles |= args.yt_subtitles;
    }

    pub fn validate(&self) -> Result<()> {
        if self.transcriber.command.is_empty() {
            return Err(SubgenError::Config(
                "transcriber.command must contain at least the program name".to_string(),
            ));
        }
        if self.transcriber.model.trim().is_empty() {
            return Err(SubgenError::Config("transcriber.model must not be empty".to_string()));
        }
        Ok(())
    }
}
