//! Index file management for navigation.
//!
//! A generated release document is only discoverable once two files point at
//! it:
//!
//! # Index Files
//!
//! - **Backlink list** (`release_notes.adoc`): one `* xref:...[...]` line per
//!   release, appended at the end
//! - **Navigation manifest** (`nav.yml`): one `    - releases/<file>` entry per
//!   release, inserted just before a fixed sentinel entry so ordering is stable
//!
//! # Idempotence
//!
//! Each update reads the whole file, decides whether the entry is already
//! present, and rewrites the file atomically only when it changed. Running
//! the updater twice for the same release leaves both files untouched the
//! second time.
//!
//! # Limitations
//!
//! There is no locking. Two concurrent invocations can lose one of the
//! entries; the tool assumes a single writer.

use crate::config::Settings;
use crate::error::{ReleaseNotesError, Result};
use crate::utils::atomic_write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// What an update did to one index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Added,
    AlreadyPresent,
}

/// Outcome of [`IndexUpdater::register`]; each file is updated independently.
#[derive(Debug)]
pub struct IndexReport {
    pub backlinks: Result<IndexChange>,
    pub navigation: Result<IndexChange>,
}

impl IndexReport {
    pub fn is_ok(&self) -> bool {
        self.backlinks.is_ok() && self.navigation.is_ok()
    }
}

/// Registers generated documents in the backlink list and navigation manifest.
#[derive(Debug, Clone)]
pub struct IndexUpdater {
    pub backlink_file: PathBuf,
    pub backlink_xref_prefix: String,
    pub nav_file: PathBuf,
    pub nav_sentinel: String,
    pub product: String,
}

impl IndexUpdater {
    pub fn from_settings(settings: &Settings) -> Self {
        IndexUpdater {
            backlink_file: settings.backlink_file.clone(),
            backlink_xref_prefix: settings.backlink_xref_prefix.clone(),
            nav_file: settings.nav_file.clone(),
            nav_sentinel: settings.nav_sentinel.clone(),
            product: settings.product.clone(),
        }
    }

    /// `* xref:releases/release-2.6.0.adoc[CDE-Release-2.6.0]`
    pub fn backlink_entry(&self, version: &str, filename: &str) -> String {
        format!(
            "* xref:{}{filename}[{}-Release-{version}]",
            self.backlink_xref_prefix, self.product
        )
    }

    /// `    - releases/release-2.6.0.adoc`
    pub fn nav_entry(&self, filename: &str) -> String {
        format!("    - releases/{filename}")
    }

    /// Register `filename` in both index files.
    ///
    /// Failures are logged and reported per file; they never affect the
    /// document that was already written.
    #[instrument(level = "info", skip(self))]
    pub async fn register(&self, version: &str, filename: &str) -> IndexReport {
        let backlinks = self.update_backlinks(version, filename).await;
        if let Err(e) = &backlinks {
            error!(path = %self.backlink_file.display(), error = %e, "Failed to update backlink list");
        }
        let navigation = self.update_navigation(filename).await;
        if let Err(e) = &navigation {
            error!(path = %self.nav_file.display(), error = %e, "Failed to update navigation manifest");
        }
        IndexReport {
            backlinks,
            navigation,
        }
    }

    /// Append the backlink entry unless the file already contains it.
    /// A missing backlink file is created.
    #[instrument(level = "debug", skip(self), fields(path = %self.backlink_file.display()))]
    pub async fn update_backlinks(&self, version: &str, filename: &str) -> Result<IndexChange> {
        let entry = self.backlink_entry(version, filename);
        let content = read_optional(&self.backlink_file).await?.unwrap_or_default();

        if content.contains(&entry) {
            warn!(%entry, "Release already listed in backlink file; nothing to do");
            return Ok(IndexChange::AlreadyPresent);
        }

        let eol = line_ending(&content);
        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push_str(eol);
        }
        updated.push_str(&entry);
        updated.push_str(eol);

        atomic_write(&self.backlink_file, updated.as_bytes()).await?;
        info!(%entry, "Updated backlink list");
        Ok(IndexChange::Added)
    }

    /// Insert the navigation entry right before the sentinel line.
    ///
    /// # Errors
    ///
    /// - [`ReleaseNotesError::NotFound`] when the manifest does not exist
    /// - [`ReleaseNotesError::IndexSentinelMissing`] when the sentinel line is absent
    #[instrument(level = "debug", skip(self), fields(path = %self.nav_file.display()))]
    pub async fn update_navigation(&self, filename: &str) -> Result<IndexChange> {
        let entry = self.nav_entry(filename);
        let content = read_optional(&self.nav_file)
            .await?
            .ok_or_else(|| ReleaseNotesError::NotFound(self.nav_file.clone()))?;

        let updated = match insert_before_sentinel(&content, &entry, &self.nav_sentinel) {
            Insertion::Updated(updated) => updated,
            Insertion::AlreadyPresent => {
                warn!(%entry, "Release already listed in navigation manifest; nothing to do");
                return Ok(IndexChange::AlreadyPresent);
            }
            Insertion::SentinelMissing => {
                return Err(ReleaseNotesError::IndexSentinelMissing {
                    sentinel: self.nav_sentinel.clone(),
                    path: self.nav_file.clone(),
                });
            }
        };

        atomic_write(&self.nav_file, updated.as_bytes()).await?;
        info!(%entry, "Updated navigation manifest");
        Ok(IndexChange::Added)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Insertion {
    Updated(String),
    AlreadyPresent,
    SentinelMissing,
}

fn insert_before_sentinel(content: &str, entry: &str, sentinel: &str) -> Insertion {
    let mut lines: Vec<&str> = content.lines().collect();
    if lines.iter().any(|l| l.trim_end() == entry) {
        return Insertion::AlreadyPresent;
    }
    let Some(pos) = lines.iter().position(|l| l.trim_end() == sentinel.trim_end()) else {
        return Insertion::SentinelMissing;
    };
    lines.insert(pos, entry);

    let eol = line_ending(content);
    let mut updated = lines.join(eol);
    if content.ends_with('\n') {
        updated.push_str(eol);
    }
    Insertion::Updated(updated)
}

/// CRLF if the file already uses it, LF otherwise.
fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ReleaseNotesError::io(path, e)),
    }
}
