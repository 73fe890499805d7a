//! Data models for a release notes record.
//!
//! This module defines the structures deserialized from
//! `release-notes-<version>.json`:
//! - [`ReleaseNotes`]: the root record for one release
//! - [`Section`]: a named node of the section tree
//! - [`Ticket`], [`Highlight`], [`Patch`]: the leaves referenced by sections
//! - [`SchemaVersion`]: which of the two section-shape conventions is accepted
//!
//! Optional lists are kept as `Option<Vec<_>>` so that an absent list and an
//! empty list survive a load/save round trip unchanged.

use crate::error::{ReleaseNotesError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identifier of a ticket or highlight, either numeric or textual.
///
/// Two identifiers are equal when their rendered forms are equal, so `42`
/// and `"42"` name the same ticket (both render as `RD-42`).
#[derive(Debug, Clone, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl ItemId {
    /// The rendered form used in links and comparisons.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            ItemId::Number(n) => Cow::Owned(n.to_string()),
            ItemId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

/// A tracked work item.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Ticket {
    pub id: ItemId,
    pub title: String,
    /// Back-reference to the [`Highlight`] this ticket substantiates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_id: Option<ItemId>,
}

/// A curated summary entry, rendered only when at least one ticket links to it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Highlight {
    pub id: ItemId,
    #[serde(alias = "title")]
    pub description: String,
}

/// A named node of the section tree.
///
/// `name` must be unique among its siblings; see
/// [`crate::sections::validate_tree`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Section {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<Ticket>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<Highlight>>,
}

impl Section {
    /// A fresh node with an empty ticket list.
    pub fn new(name: impl Into<String>, with_subsections: bool) -> Self {
        Section {
            name: name.into(),
            tickets: Some(Vec::new()),
            subsections: with_subsections.then(Vec::new),
            highlights: None,
        }
    }

    pub fn tickets(&self) -> &[Ticket] {
        self.tickets.as_deref().unwrap_or_default()
    }

    pub fn subsections(&self) -> &[Section] {
        self.subsections.as_deref().unwrap_or_default()
    }

    pub fn highlights(&self) -> &[Highlight] {
        self.highlights.as_deref().unwrap_or_default()
    }
}

/// A post-release hotfix bundle.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Patch {
    pub number: String,
    /// Human date such as `1st January 2024`; `None` renders a placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// The root record for one release.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReleaseNotes {
    #[serde(rename = "cde_version", alias = "version")]
    pub version: String,
    /// GA date shown in the "GA Milestone" block; `None` renders `TBD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub overview: String,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

impl ReleaseNotes {
    /// An empty record for a new release.
    pub fn new(version: impl Into<String>) -> Self {
        ReleaseNotes {
            version: version.into(),
            release_date: None,
            overview: String::new(),
            highlights: Vec::new(),
            sections: Vec::new(),
            patches: Vec::new(),
        }
    }
}

/// Which section-shape convention a record must follow.
///
/// - `legacy: true`: highlights live only in the top-level `highlights` list.
/// - `legacy: false`: highlights live only inside sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SchemaVersion {
    #[serde(default)]
    pub legacy: bool,
}

impl SchemaVersion {
    pub const LEGACY: SchemaVersion = SchemaVersion { legacy: true };
    pub const CURRENT: SchemaVersion = SchemaVersion { legacy: false };

    pub fn name(&self) -> &'static str {
        if self.legacy { "legacy" } else { "current" }
    }
}

impl ReleaseNotes {
    /// Check that highlights appear only where `schema` allows them.
    ///
    /// # Errors
    ///
    /// [`ReleaseNotesError::SchemaViolation`] naming the first misplaced list.
    pub fn check_schema(&self, schema: SchemaVersion) -> Result<()> {
        let violation = |reason: String| ReleaseNotesError::SchemaViolation {
            schema: schema.name().to_string(),
            reason,
        };
        if schema.legacy {
            if let Some(path) = first_section_with_highlights(&self.sections, &mut Vec::new()) {
                return Err(violation(format!(
                    "section \"{path}\" carries highlights; legacy records keep them at the top level"
                )));
            }
        } else if !self.highlights.is_empty() {
            return Err(violation(
                "top-level highlights are only accepted by the legacy schema".to_string(),
            ));
        }
        Ok(())
    }
}

fn first_section_with_highlights<'a>(
    sections: &'a [Section],
    trail: &mut Vec<&'a str>,
) -> Option<String> {
    for section in sections {
        trail.push(&section.name);
        if !section.highlights().is_empty() {
            return Some(trail.join("."));
        }
        if let Some(found) = first_section_with_highlights(section.subsections(), trail) {
            return Some(found);
        }
        trail.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_numeric_and_text_compare_by_key() {
        assert_eq!(ItemId::from(42), ItemId::from("42"));
        assert_ne!(ItemId::from(42), ItemId::from("43"));
        assert_eq!(ItemId::from(7).to_string(), "7");
    }

    #[test]
    fn test_release_notes_deserialization() {
        let json = r#"{
            "cde_version": "2.6.0",
            "overview": "Overview text",
            "sections": [
                {
                    "name": "Features",
                    "tickets": [{"id": 100, "title": "Add X", "highlight_id": "H1"}],
                    "subsections": []
                }
            ],
            "highlights": [{"id": "H1", "description": "Big thing"}]
        }"#;

        let notes: ReleaseNotes = serde_json::from_str(json).unwrap();
        assert_eq!(notes.version, "2.6.0");
        assert_eq!(notes.sections.len(), 1);
        assert_eq!(notes.sections[0].tickets()[0].id, ItemId::Number(100));
        assert_eq!(
            notes.sections[0].tickets()[0].highlight_id,
            Some(ItemId::from("H1"))
        );
        assert!(notes.patches.is_empty());
        assert!(notes.release_date.is_none());
    }

    #[test]
    fn test_version_alias_accepted() {
        let json = r#"{"version": "1.0.0", "overview": "", "sections": []}"#;
        let notes: ReleaseNotes = serde_json::from_str(json).unwrap();
        assert_eq!(notes.version, "1.0.0");
    }

    #[test]
    fn test_absent_and_empty_subsections_round_trip() {
        let json = r#"[{"name": "A", "tickets": []}, {"name": "B", "tickets": [], "subsections": []}]"#;
        let sections: Vec<Section> = serde_json::from_str(json).unwrap();
        assert!(sections[0].subsections.is_none());
        assert_eq!(sections[1].subsections, Some(Vec::new()));

        let out = serde_json::to_value(&sections).unwrap();
        assert!(out[0].get("subsections").is_none());
        assert!(out[1]["subsections"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_highlight_title_alias() {
        let h: Highlight = serde_json::from_str(r#"{"id": 1, "title": "Faster"}"#).unwrap();
        assert_eq!(h.description, "Faster");
    }

    #[test]
    fn test_check_schema() {
        let mut notes = ReleaseNotes::new("1.0.0");
        let mut section = Section::new("Features", true);
        section.highlights = Some(vec![Highlight {
            id: ItemId::from("H1"),
            description: "Nested".to_string(),
        }]);
        notes.sections.push(section);

        assert!(notes.check_schema(SchemaVersion::CURRENT).is_ok());
        match notes.check_schema(SchemaVersion::LEGACY) {
            Err(ReleaseNotesError::SchemaViolation { schema, reason }) => {
                assert_eq!(schema, "legacy");
                assert!(reason.contains("Features"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }

        notes.sections[0].highlights = None;
        notes.highlights.push(Highlight {
            id: ItemId::from("H1"),
            description: "Top".to_string(),
        });
        assert!(notes.check_schema(SchemaVersion::LEGACY).is_ok());
        assert!(matches!(
            notes.check_schema(SchemaVersion::CURRENT),
            Err(ReleaseNotesError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_schema_version_names() {
        assert_eq!(SchemaVersion::LEGACY.name(), "legacy");
        assert_eq!(SchemaVersion::default(), SchemaVersion::CURRENT);
    }
}
