// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photoloc: photo location viewer.
//
// Entry point. Initialises logging and backend services, then drives one
// host entry point per subcommand: an inbound share, the page's save and
// map calls, and the map diagnosis.

mod events;
mod services;
mod state;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use photoloc_core::AppConfig;
use photoloc_core::error::Result;
use photoloc_core::types::{ACTION_SEND, ACTION_SEND_MULTIPLE, ImageReference, ShareAction, ShareIntent};
use tokio::sync::mpsc;

use events::{EventLoop, UiEvent};
use services::app_services::AppServices;
use state::Presentation;

#[derive(Debug, Parser)]
#[command(name = "photoloc", version, about = "Show where a photo was taken")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Share one or more photos into the app (URIs or file paths).
    Share {
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// Save a base64 or data-URL image payload read from FILE.
    Save { file: PathBuf, name: String },
    /// Open a position in the external map app.
    Map {
        #[arg(allow_hyphen_values = true)]
        latitude: String,
        #[arg(allow_hyphen_values = true)]
        longitude: String,
        name: String,
    },
    /// Report installed map apps.
    Diagnose,
    /// Print the active configuration.
    Config {
        /// Write the default configuration back to disk first.
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(command = ?cli.command, "Photoloc starting");

    let svc = match AppServices::init() {
        Ok(s) => {
            tracing::info!("backend services initialised");
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "data directory unusable, using defaults");
            AppServices::fallback()
        }
    };

    match run(cli.command, svc).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("photoloc: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, svc: AppServices) -> std::result::Result<(), Box<dyn Error>> {
    match command {
        Command::Share { references } => share(svc, &references).await,
        Command::Save { file, name } => {
            let payload = std::fs::read_to_string(&file)?;
            let handle = svc.save_image(payload.trim(), &name)?;
            println!("saved: {handle}");
            Ok(())
        }
        Command::Map {
            latitude,
            longitude,
            name,
        } => {
            let outcome = svc.open_in_map(&latitude, &longitude, &name)?;
            println!("{outcome:?}");
            Ok(())
        }
        Command::Diagnose => {
            print!("{}", svc.diagnose_map());
            Ok(())
        }
        Command::Config { reset } => {
            if reset {
                svc.save_config(&AppConfig::default())?;
            }
            println!("# {}", svc.data_dir().display());
            println!("{}", serde_json::to_string_pretty(&svc.config())?);
            Ok(())
        }
    }
}

/// Deliver the references as one share intent, signal page readiness and
/// wait for the loop to go idle.
async fn share(svc: AppServices, references: &[String]) -> std::result::Result<(), Box<dyn Error>> {
    let streams = references
        .iter()
        .map(|raw| reference_from_arg(raw))
        .collect::<Result<Vec<_>>>()?;
    let action = if streams.len() > 1 {
        ACTION_SEND_MULTIPLE
    } else {
        ACTION_SEND
    };
    let intent = ShareIntent {
        action: ShareAction::from_action(action),
        mime_type: Some("image/*".into()),
        streams,
    };

    let (tx, rx) = mpsc::channel(16);
    let event_loop = tokio::spawn(EventLoop::new(svc).run(rx));
    for event in [UiEvent::ShareReceived(intent), UiEvent::PageReady] {
        tx.send(event).await?;
    }
    drop(tx);

    let state = event_loop.await?;
    match state.current {
        Some((reference, Presentation::Location(payload))) => {
            println!("{reference}");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Some((reference, Presentation::NoLocation)) => println!("{reference}: no location data"),
        Some((reference, Presentation::Unreadable)) => println!("{reference}: unreadable"),
        None => println!("nothing to show"),
    }
    Ok(())
}

/// A URI as given, or an existing file path turned into a `file://` URI.
fn reference_from_arg(raw: &str) -> Result<ImageReference> {
    let path = Path::new(raw);
    if path.exists() {
        return ImageReference::from_file_path(std::fs::canonicalize(path)?);
    }
    ImageReference::parse(raw)
}
