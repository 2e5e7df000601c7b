//! subgenx - Subtitle generation with WhisperX
//!
//! Turns audio files, video files, directories and YouTube URLs into subtitle
//! files by delegating to ffmpeg, yt-dlp and the WhisperX CLI.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod freshness;
pub mod media;
pub mod progress;
pub mod source;
pub mod transcribe;
pub mod workflow;
