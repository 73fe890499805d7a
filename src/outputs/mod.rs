//! Output generation modules for release notes documents and index files.
//!
//! # Submodules
//!
//! - [`asciidoc`]: Renders a `ReleaseNotes` record into AsciiDoc
//! - [`json`]: Locates, loads, validates and saves release notes JSON files
//! - [`indexes`]: Registers generated documents in the backlink list and
//!   navigation manifest
//!
//! # Output Structure
//!
//! ```text
//! docs/modules/user-guide/
//! ├── nav.yml                       # navigation manifest
//! └── pages/
//!     ├── release_notes.adoc        # backlink list
//!     └── releases/
//!         ├── release-notes-2.6.0.json
//!         └── release-2.6.0.adoc
//! ```

pub mod asciidoc;
pub mod indexes;
pub mod json;
