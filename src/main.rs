//! # CDE Release Notes
//!
//! Command-line entry point. Turns a structured `release-notes-<version>.json`
//! record into the AsciiDoc page published in the CDE user guide, and
//! registers the page in the guide's navigation.
//!
//! ## Usage
//!
//! ```sh
//! cde_release_notes add-section 2.6.0 "Features.Networking"
//! cde_release_notes add-ticket 2.6.0 "Features.Networking" --id 100 --title "Add X"
//! cde_release_notes generate 2.6.0
//! ```
//!
//! ## Architecture
//!
//! The `generate` pipeline runs sequentially:
//! 1. **Loading**: Locate and validate the JSON record (required keys, schema
//!    version, unique section names and ticket ids)
//! 2. **Rendering**: Produce the whole AsciiDoc document in memory
//! 3. **Output**: Atomically write `release-<version>.adoc`
//! 4. **Indexing**: Register the document in the backlink list and the
//!    navigation manifest (best effort; failures are logged)

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use cde_release_notes::cli::{Cli, Command};
use cde_release_notes::commands;
use cde_release_notes::config::Settings;
use cde_release_notes::error::ReleaseNotesError;
use cde_release_notes::outputs::indexes::IndexChange;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(args.global.verbose)));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(args.global.config.as_deref())
        .await?
        .with_overrides(&args.global);
    debug!(?settings, "Resolved settings");

    let result = run(&settings, args.command).await;
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
        if let Some(hint) = remediation_hint(e) {
            info!("Hint: {hint}");
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    result.map_err(Into::into)
}

async fn run(settings: &Settings, command: Command) -> Result<(), ReleaseNotesError> {
    match command {
        Command::Generate { version } => {
            let outcome = commands::generate(settings, &version).await?;
            info!(path = %outcome.document.display(), "AsciiDoc file generated");
            for (name, change) in [
                ("backlink list", &outcome.indexes.backlinks),
                ("navigation manifest", &outcome.indexes.navigation),
            ] {
                match change {
                    Ok(IndexChange::Added) => info!(index = name, "Registered release"),
                    Ok(IndexChange::AlreadyPresent) => {
                        info!(index = name, "Release was already registered")
                    }
                    Err(_) => warn!(index = name, "Index not updated; fix it by hand or re-run"),
                }
            }
        }
        Command::Latest => {
            let path = commands::latest(settings).await?;
            println!("{}", path.display());
        }
        Command::AddSection {
            version,
            section,
            no_subsections,
        } => {
            let path = commands::add_section(settings, &version, &section, !no_subsections).await?;
            info!(path = %path.display(), %section, "Section added");
        }
        Command::AddTicket {
            version,
            section,
            id,
            title,
            highlight_id,
        } => {
            let path = commands::add_ticket(
                settings,
                &version,
                &section,
                &id,
                &title,
                highlight_id.as_deref(),
            )
            .await?;
            info!(path = %path.display(), %id, "Ticket added");
        }
    }
    Ok(())
}

/// Log level used when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// A command the user can run to fix a recoverable failure.
fn remediation_hint(err: &ReleaseNotesError) -> Option<String> {
    match err {
        ReleaseNotesError::NotFound(path) => {
            let version = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("release-notes-"))
                .and_then(|n| n.strip_suffix(".json"))?;
            Some(format!(
                "create it first with `cde_release_notes add-section {version} <SECTION>`"
            ))
        }
        ReleaseNotesError::SectionNotFound { path, .. } => Some(format!(
            "create it first with `cde_release_notes add-section <VERSION> \"{path}\"`"
        )),
        _ => None,
    }
}
