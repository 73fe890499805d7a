//! Command-line interface definitions for the release notes tool.
//!
//! Global options may also come from environment variables; anything set
//! here overrides the YAML configuration file.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the release notes tool.
///
/// # Examples
///
/// ```sh
/// # Render release-notes-2.6.0.json and register it in the navigation
/// cde_release_notes generate 2.6.0
///
/// # Create a nested section, then file a ticket under it
/// cde_release_notes add-section 2.6.0 "Features.Networking"
/// cde_release_notes add-ticket 2.6.0 "Features.Networking" --id 100 --title "Add X"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Optional path to a YAML configuration file
    #[arg(short, long, global = true, env = "RELEASE_NOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding release-notes-<version>.json files
    #[arg(long, global = true, env = "RELEASE_NOTES_DIR")]
    pub release_notes_dir: Option<PathBuf>,

    /// Directory the generated release-<version>.adoc is written to
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Accept only top-level highlights (the legacy record layout)
    #[arg(long, global = true)]
    pub legacy_schema: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the release notes for VERSION and register the document
    Generate {
        /// Release version, e.g. 2.6.0
        version: String,
    },

    /// Print the path of the newest release notes file
    Latest,

    /// Create a (possibly nested) section, e.g. "Features.Networking"
    AddSection {
        version: String,
        /// Dotted section path
        section: String,
        /// Leave the subsections field out of a newly created leaf section
        #[arg(long)]
        no_subsections: bool,
    },

    /// Add a ticket to an existing section
    AddTicket {
        version: String,
        /// Dotted section path
        section: String,
        /// Ticket id (canonical numbers like 42 are stored as numbers, 007 stays text)
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        /// Highlight this ticket substantiates
        #[arg(long)]
        highlight_id: Option<String>,
    },
}
