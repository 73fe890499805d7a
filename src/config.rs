//! Layered configuration: built-in defaults, then an optional YAML file,
//! then command-line flags.
//!
//! ```yaml
//! release_notes_dir: docs/modules/user-guide/pages/releases
//! output_dir: docs/modules/user-guide/pages/releases
//! tracker_base_url: https://tracker.example.com/browse
//! legacy_schema: false
//! ```

use crate::cli::GlobalArgs;
use crate::error::{ReleaseNotesError, Result};
use crate::models::SchemaVersion;
use crate::outputs::asciidoc::RenderOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const RELEASES_DIR: &str = "docs/modules/user-guide/pages/releases";

/// Runtime settings for one invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where `release-notes-<version>.json` files live.
    pub release_notes_dir: PathBuf,
    /// Where `release-<version>.adoc` is written.
    pub output_dir: PathBuf,
    /// Ticket tracker browse URL; links are `<base>/<prefix>-<id>`.
    pub tracker_base_url: String,
    pub ticket_prefix: String,
    /// Product label used in headings and anchors (`CDE-Release-2.6.0`).
    pub product: String,
    /// Flat list of links to every release document.
    pub backlink_file: PathBuf,
    /// Prefix of the xref target written into the backlink file.
    pub backlink_xref_prefix: String,
    /// Navigation manifest receiving `    - releases/<file>` entries.
    pub nav_file: PathBuf,
    /// Existing manifest line new entries are inserted before.
    pub nav_sentinel: String,
    pub legacy_schema: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            release_notes_dir: PathBuf::from(RELEASES_DIR),
            output_dir: PathBuf::from(RELEASES_DIR),
            tracker_base_url: "https://ciena-cloudjira-rd-it.atlassian.net/browse".to_string(),
            ticket_prefix: "RD".to_string(),
            product: "CDE".to_string(),
            backlink_file: PathBuf::from("docs/modules/user-guide/pages/release_notes.adoc"),
            backlink_xref_prefix: "releases/".to_string(),
            nav_file: PathBuf::from("docs/modules/user-guide/nav.yml"),
            nav_sentinel: "    - releases/archived_releases.adoc".to_string(),
            legacy_schema: false,
        }
    }
}

impl Settings {
    /// Load settings from `path` if given, otherwise use defaults.
    #[instrument(level = "debug", skip_all, fields(path = ?path))]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .await
                    .map_err(|e| ReleaseNotesError::io(path, e))?;
                let parsed = Self::from_yaml(&raw, path)?;
                info!(path = %path.display(), "Loaded configuration");
                parsed
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn from_yaml(raw: &str, path: &Path) -> Result<Self> {
        // An empty file is a valid "all defaults" configuration.
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ReleaseNotesError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(dir) = &args.release_notes_dir {
            self.release_notes_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if args.legacy_schema {
            self.legacy_schema = true;
        }
        self
    }

    /// The tracker URL must be absolute http(s) with a host.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.tracker_base_url).map_err(|e| {
            ReleaseNotesError::Config(format!(
                "tracker_base_url \"{}\": {e}",
                self.tracker_base_url
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ReleaseNotesError::Config(format!(
                "tracker_base_url \"{}\" must be an http(s) URL with a host",
                self.tracker_base_url
            )));
        }
        if self.ticket_prefix.trim().is_empty() {
            return Err(ReleaseNotesError::Config(
                "ticket_prefix must not be empty".to_string(),
            ));
        }
        if self.nav_sentinel.trim().is_empty() {
            return Err(ReleaseNotesError::Config(
                "nav_sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schema(&self) -> SchemaVersion {
        SchemaVersion {
            legacy: self.legacy_schema,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            tracker_base_url: self.tracker_base_url.trim_end_matches('/').to_string(),
            ticket_prefix: self.ticket_prefix.clone(),
            product: self.product.clone(),
            schema: self.schema(),
        }
    }
}
