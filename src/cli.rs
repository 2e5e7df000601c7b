use clap::Parser;
use std::path::PathBuf;

use crate::config::OutputFormat;

/// Transcribe audio and video files to subtitles using WhisperX.
///
/// Flags left unset fall back to the configuration file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WhisperX model to use (default: small)
    #[arg(long)]
    pub model: Option<String>,

    /// Output subtitle format (default: srt)
    #[arg(long, alias = "output_format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Language of the audio (default: auto-detect, slower and error-prone)
    #[arg(long)]
    pub language: Option<String>,

    /// Device to use for transcription (default: cuda if available, otherwise cpu)
    #[arg(long)]
    pub device: Option<String>,

    /// Compute type for transcription (default: float16 if cuda is available, otherwise int8)
    #[arg(long, alias = "compute_type")]
    pub compute_type: Option<String>,

    /// Force transcription even if output file already exists and is up-to-date
    #[arg(short, long)]
    pub force: bool,

    /// Audio track to use for video files (default: 0, the first audio track)
    #[arg(long, alias = "audio_track")]
    pub audio_track: Option<u32>,

    /// Directory for subtitle files (default: next to the audio file)
    #[arg(short, long, alias = "output_dir")]
    pub output_dir: Option<PathBuf>,

    /// Download the full video from YouTube instead of audio only
    #[arg(long)]
    pub yt_video: bool,

    /// Also download the subtitles published on YouTube
    #[arg(long)]
    pub yt_subtitles: bool,

    /// List the audio tracks of video inputs instead of transcribing
    #[arg(long)]
    pub list_tracks: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Audio or video files, directories containing such files, or YouTube URLs
    #[arg(required_unless_present = "dump_config")]
    pub locations: Vec<String>,
}
