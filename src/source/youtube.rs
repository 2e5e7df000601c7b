use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::{Source, SourceOutcome};
use crate::config::YoutubeConfig;
use crate::error::{Result, SubgenError};
use crate::media::{is_youtube_url, MediaCommand};
use crate::progress::spinner;

/// Fetches a remote location to a local file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the URL and return the path of the final file
    async fn download(&self, url: &str) -> Result<PathBuf>;
}

/// yt-dlp backed downloader
pub struct YtDlpDownloader {
    config: YoutubeConfig,
    language: Option<String>,
}

impl YtDlpDownloader {
    pub fn new(config: YoutubeConfig, language: Option<String>) -> Self {
        Self { config, language }
    }

    pub fn build_command(&self, url: &str) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.config.binary_path, "YouTube download");

        cmd = if self.config.download_video {
            cmd.args(["-f", "bestvideo*+bestaudio/best"])
        } else {
            cmd.args(["-f", "bestaudio/best", "-x", "--audio-format", "mp3"])
                .arg("--audio-quality")
                .arg(&self.config.audio_quality)
        };

        if self.config.download_subtitles {
            let langs = self.language.as_deref().unwrap_or("all");
            cmd = cmd.args(["--write-subs", "--sub-langs", langs]);
        }

        cmd.args(["--no-simulate", "--print", "after_move:filepath"])
            .arg("-P")
            .output(&self.config.download_dir)
            .arg("-o")
            .arg(&self.config.output_template)
            .arg(url)
    }
}

/// The last non-empty line yt-dlp printed is the final file path
pub fn parse_downloaded_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, url: &str) -> Result<PathBuf> {
        let pb = spinner(format!("Downloading from YouTube: {}", url));
        let result = self.build_command(url).execute().await;
        pb.finish_and_clear();

        let stdout = result.map_err(|e| SubgenError::Download(e.to_string()))?;
        parse_downloaded_path(&stdout).ok_or_else(|| {
            SubgenError::Download(format!("yt-dlp did not report a file for {}", url))
        })
    }
}

/// YouTube URLs are downloaded; audio is used directly, video is handed back for conversion
pub struct YoutubeSource {
    downloader: Box<dyn Downloader>,
    download_video: bool,
}

impl YoutubeSource {
    pub fn new(downloader: Box<dyn Downloader>, download_video: bool) -> Self {
        Self {
            downloader,
            download_video,
        }
    }
}

#[async_trait]
impl Source for YoutubeSource {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn can_handle(&self, location: &str) -> bool {
        is_youtube_url(location)
    }

    async fn handle(&self, location: &str) -> Result<SourceOutcome> {
        info!("Downloading {} from YouTube: {}", if self.download_video { "video" } else { "audio" }, location);

        let path = self.downloader.download(location).await?;
        info!("Downloaded {}", path.display());

        if self.download_video {
            let location = path
                .to_str()
                .ok_or_else(|| SubgenError::Download(format!("Non UTF-8 path: {}", path.display())))?
                .to_string();
            Ok(SourceOutcome::Locations(vec![location]))
        } else {
            Ok(SourceOutcome::Audio(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_audio_download_command() {
        let downloader = YtDlpDownloader::new(YoutubeConfig::default(), Some("en".to_string()));
        let cmd = downloader.build_command(URL);

        assert_eq!(cmd.binary_path, "yt-dlp");
        assert_eq!(
            cmd.args,
            vec![
                "-f", "bestaudio/best", "-x", "--audio-format", "mp3", "--audio-quality", "192K",
                "--no-simulate", "--print", "after_move:filepath", "-P", ".", "-o",
                "%(title)s.%(ext)s", URL
            ]
        );
    }

    #[test]
    fn test_video_download_with_subtitles() {
        let config = YoutubeConfig {
            download_video: true,
            download_subtitles: true,
            download_dir: PathBuf::from("downloads"),
            ..Default::default()
        };
        let cmd = YtDlpDownloader::new(config, None).build_command(URL);

        assert_eq!(&cmd.args[..2], ["-f", "bestvideo*+bestaudio/best"]);
        assert!(!cmd.args.iter().any(|a| a == "-x"));
        assert!(cmd.args.windows(3).any(|w| w == ["--write-subs", "--sub-langs", "all"]));
        assert!(cmd.args.windows(2).any(|w| w == ["-P", "downloads"]));
    }

    #[test]
    fn test_parse_downloaded_path() {
        let stdout = "[download] 100%\n/music/Song Title.mp3\n\n";
        assert_eq!(parse_downloaded_path(stdout), Some(PathBuf::from("/music/Song Title.mp3")));
        assert_eq!(parse_downloaded_path("  \n"), None);
    }

    #[tokio::test]
    async fn test_audio_download_is_audio_outcome() {
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .withf(|url| url == URL)
            .times(1)
            .returning(|_| Ok(PathBuf::from("Song.mp3")));

        let source = YoutubeSource::new(Box::new(downloader), false);
        assert!(source.can_handle(URL));
        assert!(!source.can_handle("song.mp3"));
        assert_eq!(
            source.handle(URL).await.unwrap(),
            SourceOutcome::Audio(PathBuf::from("Song.mp3"))
        );
    }

    #[tokio::test]
    async fn test_video_download_is_resolved_again() {
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .returning(|_| Ok(PathBuf::from("Clip.webm")));

        let source = YoutubeSource::new(Box::new(downloader), true);
        assert_eq!(
            source.handle(URL).await.unwrap(),
            SourceOutcome::Locations(vec!["Clip.webm".to_string()])
        );
    }

    #[tokio::test]
    async fn test_download_failure_propagates() {
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .returning(|_| Err(SubgenError::Download("HTTP Error 403".to_string())));

        let source = YoutubeSource::new(Box::new(downloader), false);
        assert!(matches!(source.handle(URL).await, Err(SubgenError::Download(_))));
    }
}
