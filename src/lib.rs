//! Release notes document model, AsciiDoc renderer and index maintenance
//! for the CDE user guide.
//!
//! - [`models`] and [`sections`]: the release notes record and its section tree
//! - [`outputs::asciidoc`]: deterministic rendering
//! - [`outputs::indexes`]: idempotent registration in the navigation files
//! - [`outputs::json`]: loading and saving the JSON records
//! - [`commands`]: the subcommands driven by the binary

pub mod cli;
pub mod commands;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod outputs;
pub mod sections;
pub mod utils;
