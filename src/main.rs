use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{process::ExitCode, sync::Arc, time::Instant};
use tracing::{debug, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod backend;
mod cli;
mod config;
mod download;
mod error;
mod utils;
mod video;

use crate::{
    backend::HttpBackend,
    config::{Config, LogFormat},
    download::{ControllerOptions, DownloadState},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Base URL of the audio backend, overrides the config file
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the video id found in a URL
    Extract { url: String },
    /// Print the embed preview for a URL as JSON
    Preview { url: String },
    /// Ask the backend to fetch a video as audio and wait for the result
    Download {
        url: String,
        /// MusicBrainz recording id used to tag the audio file
        #[arg(short, long)]
        musicbrainz_id: Option<String>,
        /// How many times to start a download again after a network failure
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match config::find_config_path(args.config.as_deref()) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    config.override_backend_url(std::env::var(config::BACKEND_URL_ENV).ok());
    config.override_backend_url(args.backend_url.clone());
    Ok(config)
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // Logs go to stderr so stdout only carries command output
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(config.get_logging_format());
    debug!(?config, "Loaded configuration");

    match &args.command {
        Command::Extract { url } => {
            println!("{}", cli::extract(url)?);
        }
        Command::Preview { url } => {
            println!("{}", cli::preview(url)?);
        }
        Command::Download {
            url,
            musicbrainz_id,
            retries,
        } => {
            let backend = HttpBackend::new(config.backend_url()?)?;

            let options = ControllerOptions {
                request_timeout: config.request_timeout(),
            };

            let started = Instant::now();
            let snapshot = cli::download(
                Arc::new(backend),
                options,
                url,
                musicbrainz_id.as_deref(),
                *retries,
            )
            .await?;
            info!(
                "Download settled in {}",
                utils::format_elapsed(started.elapsed())
            );

            if snapshot.state != DownloadState::Finished {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
