//! Release notes JSON files: locating, loading, validating and saving.
//!
//! # File Layout
//!
//! ```text
//! release_notes_dir/
//! ├── release-notes-2.5.0.json
//! ├── release-notes-2.6.0.json   # input for `generate 2.6.0`
//! └── release-2.6.0.adoc         # generated (output_dir may differ)
//! ```
//!
//! Loading checks the required top-level keys before deserializing, so a
//! record missing `overview` fails with a message naming `overview` rather
//! than a generic serde error. The section tree and the schema version are
//! validated before the record is handed to anyone.

use crate::error::{ReleaseNotesError, Result};
use crate::models::{ReleaseNotes, SchemaVersion};
use crate::sections::validate_tree;
use crate::utils::atomic_write;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

static RELEASE_NOTES_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^release-notes-(\d+\.\d+\.\d+)\.json$").expect("valid release notes file regex")
});

/// Required keys; the first entry of each group may be replaced by an alias.
const REQUIRED_KEYS: &[&[&str]] = &[&["cde_version", "version"], &["overview"], &["sections"]];

/// `release-notes-<version>.json`
pub fn release_notes_filename(version: &str) -> String {
    format!("release-notes-{version}.json")
}

/// `release-<version>.adoc`
pub fn document_filename(version: &str) -> String {
    format!("release-{version}.adoc")
}

/// Path of the release notes file for `version`, if it exists.
pub async fn resolve_file_path(version: &str, release_notes_dir: &Path) -> Option<PathBuf> {
    let path = release_notes_dir.join(release_notes_filename(version));
    match fs::try_exists(&path).await {
        Ok(true) => Some(path),
        _ => {
            debug!(path = %path.display(), "Release notes file not found");
            None
        }
    }
}

/// The release notes file with the highest `X.Y.Z` version in the directory.
#[instrument(level = "debug", skip_all, fields(dir = %release_notes_dir.display()))]
pub async fn find_latest_release_notes_file(release_notes_dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(release_notes_dir)
        .await
        .map_err(|e| ReleaseNotesError::io(release_notes_dir, e))?;

    let mut latest: Option<(semver::Version, PathBuf)> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ReleaseNotesError::io(release_notes_dir, e))?
    {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(caps) = RELEASE_NOTES_FILE.captures(name) else {
            continue;
        };
        let Ok(version) = semver::Version::parse(&caps[1]) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| version > *best) {
            latest = Some((version, entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// Load and validate a release notes file.
///
/// # Errors
///
/// - [`ReleaseNotesError::NotFound`] when the file does not exist
/// - [`ReleaseNotesError::Json`] for invalid JSON or wrongly typed fields
/// - [`ReleaseNotesError::MalformedReleaseNotes`] for a missing required key
/// - [`ReleaseNotesError::SchemaViolation`], `DuplicateSectionName` or
///   `DuplicateTicketId` for structural problems
#[instrument(level = "info", skip_all, fields(path = %path.display(), schema = schema.name()))]
pub async fn load_release_notes(path: &Path, schema: SchemaVersion) -> Result<ReleaseNotes> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReleaseNotesError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(ReleaseNotesError::io(path, e)),
    };
    let notes = parse_release_notes(&raw, path)?;
    notes.check_schema(schema)?;
    validate_tree(&notes.sections)?;
    info!(
        version = %notes.version,
        sections = notes.sections.len(),
        patches = notes.patches.len(),
        "Loaded release notes"
    );
    Ok(notes)
}

fn parse_release_notes(raw: &str, path: &Path) -> Result<ReleaseNotes> {
    let json_err = |source| ReleaseNotesError::Json {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(raw).map_err(json_err)?;
    let Some(object) = value.as_object() else {
        return Err(ReleaseNotesError::MalformedReleaseNotes {
            key: REQUIRED_KEYS[0][0].to_string(),
        });
    };
    for group in REQUIRED_KEYS {
        if !group.iter().any(|key| object.contains_key(*key)) {
            return Err(ReleaseNotesError::MalformedReleaseNotes {
                key: group[0].to_string(),
            });
        }
    }
    serde_json::from_value(value).map_err(json_err)
}

/// Save release notes as JSON with 4-space indentation.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_release_notes(notes: &ReleaseNotes, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    notes.serialize(&mut ser).map_err(|source| ReleaseNotesError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    buf.push(b'\n');
    atomic_write(path, &buf).await?;
    info!("Saved release notes");
    Ok(())
}

/// Write a rendered document to `<output_dir>/release-<version>.adoc`.
#[instrument(level = "info", skip(content), fields(output_dir = %output_dir.display()))]
pub async fn write_document(content: &str, output_dir: &Path, version: &str) -> Result<PathBuf> {
    let path = output_dir.join(document_filename(version));
    atomic_write(&path, content.as_bytes()).await?;
    info!(path = %path.display(), "Wrote release notes document");
    Ok(path)
}
