// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. markers::MarkerIndex)
    clippy::module_name_repetitions
)]

//! # Prompter
//!
//! The document controller behind a teleprompter editor.
//!
//! Prompter keeps a rich text script and the state around it:
//! - Character and paragraph formatting commands
//! - Cue markers (named anchors) with wraparound navigation
//! - Sanitizing of pasted office and web markup
//! - PDF and DOCX import through external converters
//! - Case-insensitive search with an explicit not-found result
//!
//! ## Modules
//!
//! - [`document`]: Rich text model and the inline HTML reader/writer
//! - [`handler`]: The controller tying document, cursor and commands together
//! - [`markers`]: Lazily rebuilt marker index
//! - [`sanitize`]: Paste and import filtering
//! - [`import`]: External converter invocation
//! - [`search`]: Text search
//! - [`config`]: Saved command-line defaults

pub mod config;
pub mod document;
pub mod handler;
pub mod import;
pub mod markers;
pub mod sanitize;
pub mod search;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{CharFormat, RichText, RichTextDocument};
    pub use crate::handler::{ClipboardContent, DocumentHandler};
    pub use crate::markers::{Marker, MarkerIndex};
}
