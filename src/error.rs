use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Transcriber not found: {0}. Please ensure WhisperX is installed and available in your PATH")]
    TranscriberNotFound(String),

    #[error("Transcription failed: {0}. Please check the input file and stderr")]
    TranscriptionFailed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No valid audio or video files found. Please provide valid files or directories containing audio/video files")]
    NoMediaFound,
}

pub type Result<T> = std::result::Result<T, SubgenError>;
