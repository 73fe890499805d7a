//! AsciiDoc rendering of a [`ReleaseNotes`] record.
//!
//! Rendering is a single read-only pass that produces the whole document in
//! memory; nothing is written until it succeeds. The same record always
//! renders to the same bytes.
//!
//! # Layout
//!
//! ```text
//! # CDE User Guide: CDE-Release-2.6.0
//! include::ROOT:partial$attributes.adoc[]
//! [[cde-release-2-6-0]]
//! == CDE-Release-2.6.0
//! === GA Milestone:
//! === Release Overview:
//! === New Content Highlights:      (legacy schema only)
//! === <section>:                   (one per section, subsections one level deeper)
//! === Child pages (...):           (marker, then one block per patch)
//! ```
//!
//! Headings stop at `======`; subsections nested four or more levels below
//! the top share that level.

use crate::config::Settings;
use crate::dates::convert_date;
use crate::error::{ReleaseNotesError, Result};
use crate::models::{Highlight, Patch, ReleaseNotes, SchemaVersion, Section, Ticket};
use crate::sections::tickets_for_highlight;
use itertools::Itertools;
use tracing::{debug, instrument};

/// Line after which downstream tooling treats the document as hand-edited.
pub const CHILD_PAGES_MARKER: &str = "=== Child pages (hotfixes, MCP Patches, Regression Considerations & JIRAs closed, other relevant info):";

const UNKNOWN_GA_DATE: &str = "TBD";
const UNKNOWN_PATCH_DATE: &str = "#TO UPDATE#";

/// AsciiDoc caps section titles at level 5 (`======`).
const MAX_HEADING_DEPTH: usize = 6;

/// Formatting parameters for [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Browse URL of the ticket tracker, without trailing slash.
    pub tracker_base_url: String,
    pub ticket_prefix: String,
    pub product: String,
    pub schema: SchemaVersion,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Settings::default().render_options()
    }
}

impl RenderOptions {
    /// `<base>/RD-<id>[(RD-<id>) <title>]`
    pub fn ticket_link(&self, ticket: &Ticket) -> String {
        let key = format!("{}-{}", self.ticket_prefix, ticket.id);
        format!(
            "{}/{key}[({key}) {}]",
            self.tracker_base_url, ticket.title
        )
    }

    /// `CDE-Release-2.6.0`
    pub fn document_title(&self, version: &str) -> String {
        format!("{}-Release-{version}", self.product)
    }

    /// `cde-release-2-6-0`
    pub fn anchor(&self, version: &str) -> String {
        format!(
            "{}-release-{}",
            self.product.to_lowercase(),
            version.replace('.', "-")
        )
    }
}

/// Render `notes` into AsciiDoc.
///
/// # Errors
///
/// - [`ReleaseNotesError::MalformedReleaseNotes`] when the version is blank
/// - [`ReleaseNotesError::SchemaViolation`] when highlights sit where the
///   configured schema does not allow them
/// - [`ReleaseNotesError::DateParse`] when a patch date cannot be converted
#[instrument(level = "debug", skip_all, fields(version = %notes.version, schema = options.schema.name()))]
pub fn render(notes: &ReleaseNotes, options: &RenderOptions) -> Result<String> {
    if notes.version.trim().is_empty() {
        return Err(ReleaseNotesError::MalformedReleaseNotes {
            key: "cde_version".to_string(),
        });
    }
    notes.check_schema(options.schema)?;

    let version = &notes.version;
    let title = options.document_title(version);
    let mut blocks = vec![
        format!("# {} User Guide: {title}", options.product),
        "include::ROOT:partial$attributes.adoc[]\n".to_string(),
        format!("[[{}]]", options.anchor(version)),
        format!("== {title}\n"),
        "=== GA Milestone:\n".to_string(),
        format!(
            "{}\n",
            notes.release_date.as_deref().unwrap_or(UNKNOWN_GA_DATE)
        ),
        "=== Release Overview:\n".to_string(),
        format!("{}\n", notes.overview),
    ];

    if options.schema.legacy {
        blocks.push("=== New Content Highlights:".to_string());
        for highlight in &notes.highlights {
            if let Some(line) = highlight_line(highlight, &notes.sections, options) {
                blocks.push(format!("\n{line}"));
            }
        }
    }

    for section in &notes.sections {
        render_section(&mut blocks, section, 0, &notes.sections, options);
    }

    blocks.push(CHILD_PAGES_MARKER.to_string());

    for patch in &notes.patches {
        blocks.push(render_patch(patch, version, options)?);
    }

    debug!(
        blocks = blocks.len(),
        sections = notes.sections.len(),
        patches = notes.patches.len(),
        "Rendered release notes"
    );
    Ok(blocks.join("\n"))
}

fn render_section(
    blocks: &mut Vec<String>,
    section: &Section,
    depth: usize,
    tree: &[Section],
    options: &RenderOptions,
) {
    let level = depth + 3;
    if level > MAX_HEADING_DEPTH {
        debug!(section = %section.name, depth, "Heading depth capped");
    }
    let marker = "=".repeat(level.min(MAX_HEADING_DEPTH));
    // Top-level headings are separated from the preceding block by a blank line.
    let lead = if depth == 0 { "\n" } else { "" };
    blocks.push(format!("{lead}{marker} {}:\n", section.name));

    for ticket in section.tickets() {
        blocks.push(format!(
            "* {}: {}.\n",
            ticket.title,
            options.ticket_link(ticket)
        ));
    }

    for highlight in section.highlights() {
        if let Some(line) = highlight_line(highlight, tree, options) {
            blocks.push(format!("{line}\n"));
        }
    }

    for subsection in section.subsections() {
        render_section(blocks, subsection, depth + 1, tree, options);
    }
}

/// `* <description> [<link>, <link>].`, or `None` when no ticket in the whole
/// tree references the highlight.
fn highlight_line(highlight: &Highlight, tree: &[Section], options: &RenderOptions) -> Option<String> {
    let tickets = tickets_for_highlight(tree, &highlight.id);
    if tickets.is_empty() {
        debug!(highlight = %highlight.id, "Skipping highlight without tickets");
        return None;
    }
    let links = tickets
        .iter()
        .map(|t| format!("{}: {}", t.title, options.ticket_link(t)))
        .join(", ");
    Some(format!("* {} [{links}].", highlight.description))
}

fn render_patch(patch: &Patch, version: &str, options: &RenderOptions) -> Result<String> {
    let (date_token, date_text) = match patch.release_date.as_deref() {
        Some(date) => (convert_date(date)?, date),
        None => (UNKNOWN_PATCH_DATE.to_string(), UNKNOWN_PATCH_DATE),
    };

    let mut lines = vec![
        format!(
            "\n=== {}-patch-{date_token} ({})",
            options.document_title(version),
            patch.number
        ),
        "\n==== General Description".to_string(),
        format!(
            "\nThis patch was declared Generally Available on {date_text}. This patch is now supported on {} to provide the following:\n",
            options.product
        ),
    ];
    lines.extend(patch.tickets.iter().map(|t| format!("* {}\n", t.title)));
    lines.push("Relevant Jira tickets are listed below:\n".to_string());
    lines.extend(
        patch
            .tickets
            .iter()
            .map(|t| format!("* {}.\n", options.ticket_link(t))),
    );
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;

    fn ticket(id: u64, title: &str, highlight: Option<&str>) -> Ticket {
        Ticket {
            id: ItemId::from(id),
            title: title.to_string(),
            highlight_id: highlight.map(ItemId::from),
        }
    }

    fn highlight(id: &str, description: &str) -> Highlight {
        Highlight {
            id: ItemId::from(id),
            description: description.to_string(),
        }
    }

    fn features_notes() -> ReleaseNotes {
        let mut notes = ReleaseNotes::new("2.6.0");
        notes.overview = "This release adds X.".to_string();
        let mut features = Section::new("Features", true);
        features.tickets = Some(vec![ticket(100, "Add X", None)]);
        notes.sections.push(features);
        notes
    }

    fn bullet_lines_mentioning<'a>(doc: &'a str, needle: &str) -> Vec<&'a str> {
        doc.lines()
            .filter(|l| l.starts_with("* ") && l.contains(needle))
            .collect()
    }

    #[test]
    fn test_ticket_link_format() {
        let options = RenderOptions::default();
        let link = options.ticket_link(&ticket(100, "Add X", None));
        assert_eq!(
            link,
            "https://ciena-cloudjira-rd-it.atlassian.net/browse/RD-100[(RD-100) Add X]"
        );
    }

    #[test]
    fn test_anchor_and_title() {
        let options = RenderOptions::default();
        assert_eq!(options.anchor("2.6.0"), "cde-release-2-6-0");
        assert_eq!(options.document_title("2.6.0"), "CDE-Release-2.6.0");
    }

    #[test]
    fn test_end_to_end_order() {
        let doc = render(&features_notes(), &RenderOptions::default()).unwrap();
        let title = doc.find("CDE-Release-2.6.0").unwrap();
        let anchor = doc.find("cde-release-2-6-0").unwrap();
        let ticket = doc.find("RD-100").unwrap();
        assert!(title < anchor && anchor < ticket);
        assert!(doc.contains("== CDE-Release-2.6.0\n"));
        assert!(doc.contains("=== Features:"));
        assert!(doc.contains("* Add X: https://ciena-cloudjira-rd-it.atlassian.net/browse/RD-100[(RD-100) Add X]."));
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut notes = features_notes();
        notes.patches.push(Patch {
            number: "P1".to_string(),
            release_date: Some("1st January 2024".to_string()),
            tickets: vec![ticket(7, "Hotfix", None)],
        });
        let options = RenderOptions::default();
        assert_eq!(
            render(&notes, &options).unwrap(),
            render(&notes, &options).unwrap()
        );
    }

    #[test]
    fn test_ga_milestone_placeholder_and_date() {
        let mut notes = features_notes();
        let doc = render(&notes, &RenderOptions::default()).unwrap();
        assert!(doc.contains("=== GA Milestone:\n\nTBD\n"));

        notes.release_date = Some("15th March 2024".to_string());
        let doc = render(&notes, &RenderOptions::default()).unwrap();
        assert!(doc.contains("=== GA Milestone:\n\n15th March 2024\n"));
        assert!(doc.contains("=== Release Overview:\n\nThis release adds X.\n"));
    }

    #[test]
    fn test_section_highlight_filtering() {
        let mut notes = features_notes();
        notes.sections[0].tickets = Some(vec![ticket(100, "Add X", Some("H1"))]);
        notes.sections[0].highlights = Some(vec![
            highlight("H1", "X is here"),
            highlight("H2", "Nothing backs this"),
        ]);
        let doc = render(&notes, &RenderOptions::default()).unwrap();

        let h1: Vec<_> = doc.lines().filter(|l| l.contains("X is here")).collect();
        assert_eq!(h1.len(), 1);
        assert_eq!(h1[0].matches("RD-100[").count(), 1);
        assert!(!doc.contains("Nothing backs this"));
    }

    #[test]
    fn test_highlight_collects_tickets_across_tree() {
        let mut notes = features_notes();
        let mut networking = Section::new("Networking", false);
        networking.tickets = Some(vec![ticket(201, "Faster sockets", Some("H1"))]);
        notes.sections[0].subsections = Some(vec![networking]);
        let mut fixes = Section::new("Fixes", false);
        fixes.tickets = Some(vec![ticket(300, "Fix Y", Some("H1"))]);
        fixes.highlights = Some(vec![highlight("H1", "Speed")]);
        notes.sections.push(fixes);

        let doc = render(&notes, &RenderOptions::default()).unwrap();
        let line = doc.lines().find(|l| l.starts_with("* Speed [")).unwrap();
        let first = line.find("RD-201").unwrap();
        let second = line.find("RD-300").unwrap();
        assert!(first < second);
        assert!(line.contains("], Fix Y: "));
    }

    #[test]
    fn test_subsections_one_level_deeper_and_empty_heading_kept() {
        let mut notes = features_notes();
        let mut deep = Section::new("Deep", false);
        deep.tickets = Some(vec![ticket(5, "Deep work", None)]);
        let mut empty = Section::new("Empty", true);
        empty.subsections = Some(vec![deep]);
        notes.sections[0].subsections = Some(vec![empty]);

        let doc = render(&notes, &RenderOptions::default()).unwrap();
        assert!(doc.contains("\n=== Features:\n"));
        assert!(doc.contains("==== Empty:\n"));
        assert!(doc.contains("===== Deep:\n"));
        assert!(doc.find("==== Empty:").unwrap() < doc.find("RD-5[").unwrap());
    }

    #[test]
    fn test_heading_depth_is_capped() {
        let mut notes = features_notes();
        let mut child = Section::new("L4", false);
        for name in ["L3", "L2", "L1"] {
            let mut parent = Section::new(name, true);
            parent.subsections = Some(vec![child]);
            child = parent;
        }
        notes.sections[0].subsections = Some(vec![child]);

        let doc = render(&notes, &RenderOptions::default()).unwrap();
        assert!(doc.contains("\n===== L2:\n"));
        assert!(doc.contains("\n====== L3:\n"));
        assert!(doc.contains("\n====== L4:\n"));
        assert!(!doc.contains("======="));
    }

    #[test]
    fn test_legacy_highlights_block() {
        let mut notes = features_notes();
        notes.sections[0].tickets = Some(vec![ticket(100, "Add X", Some("H1"))]);
        notes.highlights = vec![highlight("H1", "X is here"), highlight("H9", "Dropped")];
        let options = RenderOptions {
            schema: SchemaVersion::LEGACY,
            ..RenderOptions::default()
        };
        let doc = render(&notes, &options).unwrap();
        let block = doc.find("=== New Content Highlights:").unwrap();
        let line = doc.find("* X is here [Add X: ").unwrap();
        assert!(block < line && line < doc.find("=== Features:").unwrap());
        assert!(!doc.contains("Dropped"));

        // The current schema rejects top-level highlights outright.
        assert!(matches!(
            render(&notes, &RenderOptions::default()),
            Err(ReleaseNotesError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_marker_precedes_patches() {
        let mut notes = features_notes();
        notes.patches.push(Patch {
            number: "P1".to_string(),
            release_date: None,
            tickets: vec![],
        });
        let doc = render(&notes, &RenderOptions::default()).unwrap();
        let marker = doc.find(CHILD_PAGES_MARKER).unwrap();
        assert!(marker > doc.find("RD-100").unwrap());
        assert!(marker < doc.find("-patch-#TO UPDATE# (P1)").unwrap());
        assert!(doc.contains("Generally Available on #TO UPDATE#."));
    }

    #[test]
    fn test_patch_rendering() {
        let mut notes = ReleaseNotes::new("2.6.0");
        notes.patches.push(Patch {
            number: "P1".to_string(),
            release_date: Some("1st January 2024".to_string()),
            tickets: vec![ticket(555, "Patch fix", None)],
        });
        let doc = render(&notes, &RenderOptions::default()).unwrap();

        let heading = doc
            .lines()
            .find(|l| l.starts_with("=== CDE-Release-2.6.0-patch-"))
            .unwrap();
        assert!(heading.contains("20240101"));
        assert!(heading.contains("(P1)"));
        assert!(doc.contains("Generally Available on 1st January 2024."));

        let bullets = bullet_lines_mentioning(&doc, "Patch fix");
        assert_eq!(bullets.len(), 2);
        assert_eq!(bullets[0], "* Patch fix");
        assert!(bullets[1].contains("RD-555[(RD-555) Patch fix]"));
    }

    #[test]
    fn test_bad_patch_date_fails_render() {
        let mut notes = features_notes();
        notes.patches.push(Patch {
            number: "P2".to_string(),
            release_date: Some("whenever".to_string()),
            tickets: vec![],
        });
        assert!(matches!(
            render(&notes, &RenderOptions::default()),
            Err(ReleaseNotesError::DateParse { input }) if input == "whenever"
        ));
    }

    #[test]
    fn test_blank_version_is_malformed() {
        let notes = ReleaseNotes::new(" ");
        assert!(matches!(
            render(&notes, &RenderOptions::default()),
            Err(ReleaseNotesError::MalformedReleaseNotes { key }) if key == "cde_version"
        ));
    }
}
