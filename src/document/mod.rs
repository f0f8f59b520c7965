//! Rich text document model.
//!
//! This module handles:
//! - Paragraphs of formatted text runs with linear positions
//! - Character and paragraph formats as plain records with overlay merges
//! - Change notification for derived indexes such as the marker index
//! - Reading and writing the inline HTML subset the editor exchanges

pub mod html;
mod rich_text;
mod types;

pub use rich_text::RichTextDocument;
pub use types::{
    Alignment, Block, BlockFormat, BlockRef, Blocks, CharFormat, Color, ContentsChange, Fragment,
    Fragments, TextRun,
};

/// Callback invoked after every content or format change.
///
/// Returns `false` once it no longer wants changes; the document then drops it.
pub type ChangeListener = Box<dyn FnMut(&ContentsChange) -> bool>;

/// What the editor logic needs from a rich text document.
pub trait RichText {
    /// Blocks in document order, each exposing its formatting fragments.
    fn blocks(&self) -> Blocks<'_>;

    /// Register a listener called after every mutation, until it returns `false`.
    fn subscribe(&mut self, listener: ChangeListener);
}
