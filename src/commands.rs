//! Subcommand implementations.
//!
//! Each command takes fully resolved [`Settings`] and returns a typed
//! result; `main` decides how failures are reported.

use crate::config::Settings;
use crate::error::{ReleaseNotesError, Result};
use crate::models::{ItemId, ReleaseNotes, Ticket};
use crate::outputs::asciidoc::render;
use crate::outputs::indexes::{IndexReport, IndexUpdater};
use crate::outputs::json::{
    document_filename, find_latest_release_notes_file, load_release_notes, release_notes_filename,
    resolve_file_path, save_release_notes, write_document,
};
use crate::sections::{find_mut, get_or_create, ticket_exists, SectionPath};
use crate::utils::ensure_writable_dir;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Result of a successful `generate`.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub document: PathBuf,
    pub indexes: IndexReport,
}

/// Load, render, write, then register the document in the indexes.
///
/// Nothing is written unless loading and rendering both succeed. Index
/// failures are reported in [`GenerateOutcome::indexes`] and do not undo
/// the document.
#[instrument(level = "info", skip(settings))]
pub async fn generate(settings: &Settings, version: &str) -> Result<GenerateOutcome> {
    let path = resolve_file_path(version, &settings.release_notes_dir)
        .await
        .ok_or_else(|| {
            ReleaseNotesError::NotFound(settings.release_notes_dir.join(release_notes_filename(version)))
        })?;

    let notes = load_release_notes(&path, settings.schema()).await?;
    let content = render(&notes, &settings.render_options())?;

    ensure_writable_dir(&settings.output_dir).await?;
    let document = write_document(&content, &settings.output_dir, &notes.version).await?;

    let updater = IndexUpdater::from_settings(settings);
    let indexes = updater
        .register(&notes.version, &document_filename(&notes.version))
        .await;

    Ok(GenerateOutcome { document, indexes })
}

/// Path of the newest release notes file.
pub async fn latest(settings: &Settings) -> Result<PathBuf> {
    find_latest_release_notes_file(&settings.release_notes_dir)
        .await?
        .ok_or_else(|| ReleaseNotesError::NotFound(settings.release_notes_dir.clone()))
}

/// Create the section at `section` (and any missing ancestors), creating the
/// release notes file itself if it does not exist yet.
#[instrument(level = "info", skip(settings))]
pub async fn add_section(
    settings: &Settings,
    version: &str,
    section: &str,
    include_subsections: bool,
) -> Result<PathBuf> {
    let path = SectionPath::parse(section)?;
    let file = settings.release_notes_dir.join(release_notes_filename(version));

    let mut notes = match load_release_notes(&file, settings.schema()).await {
        Ok(notes) => notes,
        Err(ReleaseNotesError::NotFound(_)) => {
            info!(path = %file.display(), "Starting new release notes file");
            ReleaseNotes::new(version)
        }
        Err(e) => return Err(e),
    };

    get_or_create(&mut notes.sections, &path, include_subsections)?;
    save_release_notes(&notes, &file).await?;
    info!(section = %path, "Section ready");
    Ok(file)
}

/// Add a ticket to an existing section.
///
/// # Errors
///
/// - [`ReleaseNotesError::SectionNotFound`] when the section has not been created
/// - [`ReleaseNotesError::DuplicateTicketId`] when the id is already filed anywhere
#[instrument(level = "info", skip(settings))]
pub async fn add_ticket(
    settings: &Settings,
    version: &str,
    section: &str,
    id: &str,
    title: &str,
    highlight_id: Option<&str>,
) -> Result<PathBuf> {
    let path = SectionPath::parse(section)?;
    let file = settings.release_notes_dir.join(release_notes_filename(version));
    let mut notes = load_release_notes(&file, settings.schema()).await?;

    let id = parse_item_id(id);
    if ticket_exists(&notes.sections, &id) {
        return Err(ReleaseNotesError::DuplicateTicketId {
            id: id.to_string(),
            section: path.to_string(),
        });
    }

    let target = find_mut(&mut notes.sections, &path)?;
    target.tickets.get_or_insert_with(Vec::new).push(Ticket {
        id,
        title: title.to_string(),
        highlight_id: highlight_id.map(parse_item_id),
    });

    save_release_notes(&notes, &file).await?;
    info!(section = %path, "Ticket added");
    Ok(file)
}

/// Canonical numeric ids are stored as JSON numbers, anything else as the
/// string the user typed, so `007` keeps rendering as `RD-007`.
fn parse_item_id(raw: &str) -> ItemId {
    match raw.parse::<u64>() {
        Ok(n) if n.to_string() == raw => ItemId::Number(n),
        _ => ItemId::from(raw),
    }
}
