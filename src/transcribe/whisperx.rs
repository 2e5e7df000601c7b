use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use super::{TranscriberTrait, TranscriptionOutcome};
use crate::config::TranscriberConfig;
use crate::error::{Result, SubgenError};
use crate::freshness::is_up_to_date;

/// Exit code shells report for a missing command
const COMMAND_NOT_FOUND: i32 = 127;

/// Runs the WhisperX CLI with inherited stdio so its progress is relayed
pub struct WhisperXTranscriber {
    config: TranscriberConfig,
}

impl WhisperXTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn output_dir(&self, audio_path: &Path) -> PathBuf {
        match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => audio_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Full argv, program first
    pub fn build_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<String> {
        let config = &self.config;
        let mut args = config.command.clone();

        args.extend(["--model".to_string(), config.model.clone()]);
        args.extend(["--output_format".to_string(), config.output_format.to_string()]);

        let optional = [
            ("--language", config.language.clone()),
            ("--device", config.device.clone()),
            ("--compute_type", config.compute_type.clone()),
            ("--batch_size", config.batch_size.map(|v| v.to_string())),
            ("--threads", config.threads.map(|v| v.to_string())),
            ("--chunk_size", config.chunk_size.map(|v| v.to_string())),
            ("--model_dir", config.model_dir.as_ref().map(|p| p.to_string_lossy().into_owned())),
        ];
        for (flag, value) in optional {
            if let Some(value) = value {
                args.extend([flag.to_string(), value]);
            }
        }

        if config.highlight_words {
            args.extend(["--highlight_words".to_string(), "True".to_string()]);
        }
        if let Some(width) = config.max_line_width {
            args.extend(["--max_line_width".to_string(), width.to_string()]);
        }
        if let Some(count) = config.max_line_count {
            args.extend(["--max_line_count".to_string(), count.to_string()]);
        }

        args.extend(config.extra_args.iter().cloned());
        args.extend([
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
            audio_path.to_string_lossy().into_owned(),
        ]);
        args
    }
}

/// Map the transcriber's exit status to an error
pub fn check_exit_status(program: &str, status: ExitStatus) -> Result<()> {
    match status.code() {
        Some(0) => Ok(()),
        Some(COMMAND_NOT_FOUND) => Err(SubgenError::TranscriberNotFound(program.to_string())),
        Some(code) => Err(SubgenError::TranscriptionFailed(format!(
            "{} exited with return code {}",
            program, code
        ))),
        None => Err(SubgenError::TranscriptionFailed(format!(
            "{} was terminated by a signal",
            program
        ))),
    }
}

#[async_trait]
impl TranscriberTrait for WhisperXTranscriber {
    fn output_path(&self, audio_path: &Path) -> Result<PathBuf> {
        let stem = audio_path.file_stem().ok_or_else(|| {
            SubgenError::UnsupportedFormat(format!("Invalid audio filename: {}", audio_path.display()))
        })?;

        let file_name = format!(
            "{}.{}",
            stem.to_string_lossy(),
            self.config.output_format.extension()
        );
        Ok(self.output_dir(audio_path).join(file_name))
    }

    async fn check_availability(&self) -> Result<()> {
        let (program, rest) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| SubgenError::Config("Transcriber command is empty".to_string()))?;

        debug!("Checking transcriber: {} --help", self.config.command.join(" "));
        let status = Command::new(program)
            .args(rest)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SubgenError::TranscriberNotFound(program.clone()),
                _ => SubgenError::TranscriptionFailed(format!("Failed to execute {}: {}", program, e)),
            })?;

        check_exit_status(program, status)?;
        info!("Transcriber is available: {}", program);
        Ok(())
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionOutcome> {
        if !audio_path.exists() {
            return Err(SubgenError::FileNotFound(audio_path.display().to_string()));
        }

        let output_file = self.output_path(audio_path)?;
        if is_up_to_date(&output_file, audio_path) && !self.config.force {
            info!("Skipping {}, up-to-date.", output_file.display());
            return Ok(TranscriptionOutcome::UpToDate(output_file));
        }

        let output_dir = self.output_dir(audio_path);
        tokio::fs::create_dir_all(&output_dir).await?;
        info!("Output Directory: {}", output_dir.display());

        let args = self.build_args(audio_path, &output_dir);
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| SubgenError::Config("Transcriber command is empty".to_string()))?;

        info!("Running command: {}", args.join(" "));
        let status = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SubgenError::TranscriberNotFound(program.clone()),
                _ => SubgenError::TranscriptionFailed(format!("Failed to execute {}: {}", program, e)),
            })?;
        debug!("{} finished with {}", program, status);

        check_exit_status(program, status)?;

        info!("Transcription successful. Output saved to {}.", output_file.display());
        Ok(TranscriptionOutcome::Transcribed(output_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, age_secs: u64) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn test_minimal_command() {
        let transcriber = WhisperXTranscriber::new(TranscriberConfig::default());
        let args = transcriber.build_args(Path::new("media/talk.mp3"), Path::new("media"));

        assert_eq!(
            args,
            vec![
                "whisperx", "--model", "small", "--output_format", "srt", "--output_dir", "media",
                "media/talk.mp3"
            ]
        );
    }

    #[test]
    fn test_full_command() {
        let config = TranscriberConfig {
            command: vec!["uvx".to_string(), "whisperx".to_string()],
            model: "large-v2".to_string(),
            output_format: OutputFormat::Vtt,
            language: Some("ja".to_string()),
            device: Some("cuda".to_string()),
            compute_type: Some("float16".to_string()),
            batch_size: Some(8),
            threads: Some(4),
            highlight_words: true,
            max_line_width: Some(42),
            extra_args: vec!["--vad_onset".to_string(), "0.5".to_string()],
            ..Default::default()
        };
        let args = WhisperXTranscriber::new(config).build_args(Path::new("a.mp3"), Path::new("subs"));

        assert_eq!(
            args,
            vec![
                "uvx", "whisperx", "--model", "large-v2", "--output_format", "vtt", "--language",
                "ja", "--device", "cuda", "--compute_type", "float16", "--batch_size", "8",
                "--threads", "4", "--highlight_words", "True", "--max_line_width", "42",
                "--vad_onset", "0.5", "--output_dir", "subs", "a.mp3"
            ]
        );
    }

    #[test]
    fn test_output_path_follows_audio_or_output_dir() {
        let transcriber = WhisperXTranscriber::new(TranscriberConfig::default());
        assert_eq!(
            transcriber.output_path(Path::new("/m/show.track1.mp3")).unwrap(),
            PathBuf::from("/m/show.track1.srt")
        );
        assert_eq!(
            transcriber.output_path(Path::new("song.mp3")).unwrap(),
            PathBuf::from("./song.srt")
        );

        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            output_dir: Some(PathBuf::from("/subs")),
            output_format: OutputFormat::All,
            ..Default::default()
        });
        assert_eq!(
            transcriber.output_path(Path::new("/m/show.mp3")).unwrap(),
            PathBuf::from("/subs/show.srt")
        );
    }

    #[tokio::test]
    async fn test_up_to_date_output_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.mp3");
        let subs = dir.path().join("talk.srt");
        touch(&audio, 60);
        touch(&subs, 0);

        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            command: vec!["/nonexistent/subgenx-whisperx".to_string()],
            ..Default::default()
        });

        assert_eq!(
            transcriber.transcribe(&audio).await.unwrap(),
            TranscriptionOutcome::UpToDate(subs)
        );
    }

    #[tokio::test]
    async fn test_force_runs_and_reports_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.mp3");
        touch(&audio, 60);
        touch(&dir.path().join("talk.srt"), 0);

        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            command: vec!["/nonexistent/subgenx-whisperx".to_string()],
            force: true,
            ..Default::default()
        });

        assert!(matches!(
            transcriber.transcribe(&audio).await,
            Err(SubgenError::TranscriberNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_command_is_not_available() {
        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            command: vec!["/nonexistent/subgenx-whisperx".to_string()],
            ..Default::default()
        });

        match transcriber.check_availability().await {
            Err(SubgenError::TranscriberNotFound(program)) => {
                assert_eq!(program, "/nonexistent/subgenx-whisperx")
            }
            other => panic!("expected missing transcriber, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wrapped_command_exit_127_is_not_available() {
        // A launcher that cannot find the wrapped tool reports 127
        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            command: vec!["sh".to_string(), "-c".to_string(), "exit 127".to_string()],
            ..Default::default()
        });

        assert!(matches!(
            transcriber.check_availability().await,
            Err(SubgenError::TranscriberNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runnable_command_is_available() {
        let transcriber = WhisperXTranscriber::new(TranscriberConfig {
            command: vec!["true".to_string()],
            ..Default::default()
        });

        assert!(transcriber.check_availability().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_audio_is_error() {
        let transcriber = WhisperXTranscriber::new(TranscriberConfig::default());
        assert!(matches!(
            transcriber.transcribe(Path::new("/nonexistent/a.mp3")).await,
            Err(SubgenError::FileNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_mapping() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait statuses carry the exit code in the high byte
        assert!(check_exit_status("whisperx", ExitStatus::from_raw(0)).is_ok());
        assert!(matches!(
            check_exit_status("whisperx", ExitStatus::from_raw(127 << 8)),
            Err(SubgenError::TranscriberNotFound(_))
        ));
        assert!(matches!(
            check_exit_status("whisperx", ExitStatus::from_raw(1 << 8)),
            Err(SubgenError::TranscriptionFailed(_))
        ));
        assert!(matches!(
            check_exit_status("whisperx", ExitStatus::from_raw(9)),
            Err(SubgenError::TranscriptionFailed(_))
        ));
    }
}
