//! subgenx - Subtitle generation with WhisperX
//!
//! Entry point: parses the command line, loads the configuration and runs
//! the transcription workflow over the given locations.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subgenx::cli::Args;
use subgenx::config::Config;
use subgenx::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    let guard = setup_logging(args.verbose)?;

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        // Flush the file log before exiting
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_args(&args);
    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let workflow = Workflow::new(config).await?;

    if args.list_tracks {
        for (path, tracks) in workflow.list_audio_tracks(&args.locations).await? {
            println!("\n{}", path.display());
            println!("{:<8} {:<10} {:<10} {:<10} {:<30}", "Track", "Codec", "Language", "Channels", "Title");
            println!("{}", "-".repeat(70));

            for track in tracks {
                println!(
                    "{:<8} {:<10} {:<10} {:<10} {:<30}",
                    track.index,
                    track.codec.as_deref().unwrap_or("?"),
                    track.language.as_deref().unwrap_or("und"),
                    track.channels.map(|c| c.to_string()).unwrap_or_default(),
                    track.title.as_deref().unwrap_or("")
                );
            }
        }
        return Ok(());
    }

    let summary = workflow.run(&args.locations).await?;
    info!(
        "subgenx completed: {} transcribed, {} already up-to-date",
        summary.transcribed, summary.skipped
    );
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".subgenx").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subgenx.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout is kept for --dump-config and --list-tracks output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subgenx.log").display()
    );

    Ok(guard)
}
