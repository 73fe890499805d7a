//! Navigation and integrity checks over the section tree.
//!
//! A section is addressed by a [`SectionPath`], the list of names from the
//! top-level section down to the target (`"Features.Networking"`). Sibling
//! lookup is first-match by name; [`validate_tree`] rejects duplicate
//! sibling names at load time so that lookup is never ambiguous.

use crate::error::{ReleaseNotesError, Result};
use crate::models::{ItemId, Section, Ticket};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// A non-empty list of section names, highest level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPath(Vec<String>);

impl SectionPath {
    /// Build a path from individual segments.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ReleaseNotesError::InvalidSectionPath(segments.join(".")));
        }
        Ok(SectionPath(segments))
    }

    /// Parse a dotted path such as `Features.Networking`.
    pub fn parse(dotted: &str) -> Result<Self> {
        SectionPath::new(dotted.split('.').map(str::trim))
            .map_err(|_| ReleaseNotesError::InvalidSectionPath(dotted.to_string()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    fn not_found(&self, segment: &str) -> ReleaseNotesError {
        ReleaseNotesError::SectionNotFound {
            segment: segment.to_string(),
            path: self.to_string(),
        }
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Resolve `path` to an existing section without creating anything.
///
/// # Errors
///
/// [`ReleaseNotesError::SectionNotFound`] naming the first missing segment.
pub fn find<'a>(tree: &'a [Section], path: &SectionPath) -> Result<&'a Section> {
    let mut level = tree;
    let mut found = None;
    for segment in path.segments() {
        let section = level
            .iter()
            .find(|s| &s.name == segment)
            .ok_or_else(|| path.not_found(segment))?;
        level = section.subsections();
        found = Some(section);
    }
    found.ok_or_else(|| ReleaseNotesError::InvalidSectionPath(path.to_string()))
}

/// Mutable counterpart of [`find`].
pub fn find_mut<'a>(tree: &'a mut [Section], path: &SectionPath) -> Result<&'a mut Section> {
    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(ReleaseNotesError::InvalidSectionPath(path.to_string()));
    };
    let mut level = tree;
    for segment in parents {
        let section = level
            .iter_mut()
            .find(|s| &s.name == segment)
            .ok_or_else(|| path.not_found(segment))?;
        level = match section.subsections.as_deref_mut() {
            Some(children) => children,
            None => &mut [],
        };
    }
    level
        .iter_mut()
        .find(|s| &s.name == leaf)
        .ok_or_else(|| path.not_found(leaf))
}

/// Resolve `path`, creating any missing section along the way.
///
/// New sections are appended after their existing siblings with an empty
/// ticket list. They carry an empty `subsections` list when the path has
/// more than one segment or `include_subsections` is set; otherwise the
/// field stays absent. An existing section without a subsections list gets
/// one when the path continues below it.
pub fn get_or_create<'a>(
    tree: &'a mut Vec<Section>,
    path: &SectionPath,
    include_subsections: bool,
) -> Result<&'a mut Section> {
    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(ReleaseNotesError::InvalidSectionPath(path.to_string()));
    };
    let with_subsections = !parents.is_empty() || include_subsections;

    let mut level = tree;
    for segment in parents {
        let pos = position_or_append(level, segment, true);
        level = level[pos].subsections.get_or_insert_with(Vec::new);
    }
    let pos = position_or_append(level, leaf, with_subsections);
    Ok(&mut level[pos])
}

fn position_or_append(level: &mut Vec<Section>, name: &str, with_subsections: bool) -> usize {
    match level.iter().position(|s| s.name == name) {
        Some(pos) => pos,
        None => {
            debug!(section = name, "Creating section");
            level.push(Section::new(name, with_subsections));
            level.len() - 1
        }
    }
}

/// Whether a ticket with `id` exists anywhere in the tree, at any depth.
pub fn ticket_exists(tree: &[Section], id: &ItemId) -> bool {
    tree.iter().any(|section| {
        section.tickets().iter().any(|t| &t.id == id) || ticket_exists(section.subsections(), id)
    })
}

/// All tickets of the tree in document order: a section's own tickets, then
/// those of its subsections, depth first.
pub fn tickets_in_order(tree: &[Section]) -> Vec<&Ticket> {
    let mut out = Vec::new();
    collect_tickets(tree, &mut out);
    out
}

fn collect_tickets<'a>(tree: &'a [Section], out: &mut Vec<&'a Ticket>) {
    for section in tree {
        out.extend(section.tickets());
        collect_tickets(section.subsections(), out);
    }
}

/// Tickets anywhere in the tree whose `highlight_id` equals `highlight_id`,
/// in document order.
pub fn tickets_for_highlight<'a>(tree: &'a [Section], highlight_id: &ItemId) -> Vec<&'a Ticket> {
    tickets_in_order(tree)
        .into_iter()
        .filter(|t| t.highlight_id.as_ref() == Some(highlight_id))
        .collect()
}

/// Reject duplicate sibling names and duplicate ticket ids.
///
/// # Errors
///
/// - [`ReleaseNotesError::DuplicateSectionName`] with the dotted path of the clash
/// - [`ReleaseNotesError::DuplicateTicketId`] with the section holding the second copy
pub fn validate_tree(tree: &[Section]) -> Result<()> {
    let mut seen_tickets = HashSet::new();
    validate_level(tree, &mut Vec::new(), &mut seen_tickets)
}

fn validate_level<'a>(
    level: &'a [Section],
    trail: &mut Vec<&'a str>,
    seen_tickets: &mut HashSet<String>,
) -> Result<()> {
    let mut names = HashSet::new();
    for section in level {
        trail.push(&section.name);
        if !names.insert(section.name.as_str()) {
            return Err(ReleaseNotesError::DuplicateSectionName(trail.join(".")));
        }
        for ticket in section.tickets() {
            if !seen_tickets.insert(ticket.id.as_key().into_owned()) {
                return Err(ReleaseNotesError::DuplicateTicketId {
                    id: ticket.id.to_string(),
                    section: trail.join("."),
                });
            }
        }
        validate_level(section.subsections(), trail, seen_tickets)?;
        trail.pop();
    }
    Ok(())
}
