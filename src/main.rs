//! mediafold command-line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use mediafold::config::{Config, LogFormat};
use mediafold::library::MediaLibrary;

#[derive(Parser, Debug)]
#[command(name = "mediafold")]
#[command(about = "Manage folder trees in a remote media asset library", version)]
struct Cli {
    /// Path to the configuration file (default: ./mediafold.toml)
    #[arg(long, global = true, env = "MEDIAFOLD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Delete a folder and everything below it
    Delete {
        /// Folder path, e.g. "events/2024"
        path: String,
    },
    /// Rename or move a folder and everything below it
    Rename { from: String, to: String },
    /// List child folders of a folder, or the top-level folders
    Folders {
        #[arg(long)]
        parent: Option<String>,
    },
    /// List the assets directly inside a folder
    Files { folder: String },
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_with_env(path),
        None => Config::load(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Command::Serve { port: Some(port) } = &cli.command {
        config.server.port = *port;
    }
    init_tracing(config.logging.format);

    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let library = MediaLibrary::from_config(&config).context("Failed to initialize media library")?;

    match cli.command {
        Command::Serve { .. } => {
            info!(backend = ?config.remote.backend, "Starting mediafold");
            mediafold::http::serve(library, &config.server).await?;
        },
        Command::Delete { path } => print_json(&library.delete_subtree(&path).await?)?,
        Command::Rename { from, to } => print_json(&library.rename_subtree(&from, &to).await?)?,
        Command::Folders { parent } => {
            print_json(&library.list_folders(parent.as_deref(), true).await?)?;
        },
        Command::Files { folder } => {
            print_json(&library.list_folder_contents(&folder, true).await?)?;
        },
    }

    Ok(())
}
