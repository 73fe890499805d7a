//! Error taxonomy for loading, navigating, rendering and indexing release notes.
//!
//! Navigation errors ([`ReleaseNotesError::SectionNotFound`]) are meant to be
//! recovered by the caller, which can suggest the `add-section` command.
//! Everything raised while rendering aborts the run before any file is written.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the release notes pipeline.
#[derive(Error, Debug)]
pub enum ReleaseNotesError {
    #[error("release notes file not found: {0}")]
    NotFound(PathBuf),

    #[error(
        "section \"{segment}\" does not exist (path: {path}); create it with the add-section command"
    )]
    SectionNotFound { segment: String, path: String },

    #[error("invalid section path \"{0}\": segments must be non-empty")]
    InvalidSectionPath(String),

    #[error("malformed release notes: missing required key \"{key}\"")]
    MalformedReleaseNotes { key: String },

    #[error("release notes do not match the {schema} schema: {reason}")]
    SchemaViolation { schema: String, reason: String },

    #[error("duplicate section name \"{0}\"")]
    DuplicateSectionName(String),

    #[error("duplicate ticket id {id} (in section \"{section}\")")]
    DuplicateTicketId { id: String, section: String },

    #[error("unable to parse date \"{input}\"")]
    DateParse { input: String },

    #[error("sentinel line \"{sentinel}\" not found in {path}")]
    IndexSentinelMissing { sentinel: String, path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseNotesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReleaseNotesError>;
