//! Document controller.
//!
//! [`DocumentHandler`] sits between a [`RichTextDocument`] and the editor:
//! - cursor and selection state
//! - formatting commands applied to the selection or the word under the caret
//! - file load/save, including converter-backed import
//! - clipboard paste through the sanitizer
//! - marker navigation and text search

mod file;
mod format;

pub use file::DocumentError;

use std::ops::Range;
use std::path::PathBuf;

use tracing::debug;

use crate::document::{CharFormat, RichTextDocument};
use crate::import::ConverterSet;
use crate::markers::{Marker, MarkerIndex};
use crate::sanitize;
use crate::search::Direction;

/// Clipboard payload offered to [`DocumentHandler::paste`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardContent {
    pub html: Option<String>,
    pub text: Option<String>,
    pub has_image: bool,
}

impl ClipboardContent {
    pub fn from_html(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: Some(text.into()),
            has_image: false,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Controller owning a document, its marker index and the editing state.
#[derive(Debug)]
pub struct DocumentHandler {
    document: RichTextDocument,
    markers: MarkerIndex,
    cursor_position: usize,
    selection_start: usize,
    selection_end: usize,
    file_path: Option<PathBuf>,
    converters: ConverterSet,
}

impl Default for DocumentHandler {
    fn default() -> Self {
        Self::new(RichTextDocument::new())
    }
}

impl DocumentHandler {
    /// Take ownership of `document` and attach a marker index to it.
    pub fn new(mut document: RichTextDocument) -> Self {
        let markers = MarkerIndex::attach(&mut document);
        Self {
            document,
            markers,
            cursor_position: 0,
            selection_start: 0,
            selection_end: 0,
            file_path: None,
            converters: ConverterSet::default(),
        }
    }

    /// Use `converters` for PDF and DOCX import.
    #[must_use]
    pub fn with_converters(mut self, converters: ConverterSet) -> Self {
        self.converters = converters;
        self
    }

    pub const fn document(&self) -> &RichTextDocument {
        &self.document
    }

    /// Mutable access for direct edits; the marker index still sees them.
    pub const fn document_mut(&mut self) -> &mut RichTextDocument {
        &mut self.document
    }

    pub const fn converters(&self) -> &ConverterSet {
        &self.converters
    }

    pub const fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub const fn set_cursor_position(&mut self, position: usize) {
        self.cursor_position = position;
    }

    pub const fn selection_start(&self) -> usize {
        self.selection_start
    }

    pub const fn set_selection_start(&mut self, position: usize) {
        self.selection_start = position;
    }

    pub const fn selection_end(&self) -> usize {
        self.selection_end
    }

    pub const fn set_selection_end(&mut self, position: usize) {
        self.selection_end = position;
    }

    /// Select `range` and put the caret at its start.
    pub fn select(&mut self, range: Range<usize>) {
        self.cursor_position = range.start;
        self.selection_start = range.start;
        self.selection_end = range.end;
    }

    /// Collapse the selection to a caret at `position`.
    pub fn set_caret(&mut self, position: usize) {
        self.select(position..position);
    }

    /// The selection, or an empty range at the caret, clamped to the document.
    pub fn text_cursor(&self) -> Range<usize> {
        let len = self.document.len();
        if self.selection_start == self.selection_end {
            let caret = self.cursor_position.min(len);
            caret..caret
        } else {
            let start = self.selection_start.min(self.selection_end).min(len);
            let end = self.selection_start.max(self.selection_end).min(len);
            start..end
        }
    }

    /// The range a character format command applies to: the selection, or the
    /// word under the caret when nothing is selected.
    fn word_or_selection(&self) -> Range<usize> {
        let range = self.text_cursor();
        if range.is_empty() {
            self.document.word_at(range.start)
        } else {
            range
        }
    }

    pub fn merge_format_on_word_or_selection(&mut self, format: &CharFormat) {
        let range = self.word_or_selection();
        self.document.merge_char_format(range, format);
    }

    /// Insert clipboard content over the selection.
    ///
    /// Images are ignored. HTML goes through the sanitizer unless
    /// `without_formatting` is set, in which case its text alternative is
    /// inserted instead.
    pub fn paste(&mut self, content: &ClipboardContent, without_formatting: bool) {
        if content.has_image {
            debug!("ignoring image paste");
            return;
        }
        match (&content.html, &content.text) {
            (Some(_), Some(text)) if without_formatting => self.insert_plain(text),
            (Some(_), None) if without_formatting => {}
            (Some(html), _) => {
                let filtered = sanitize::sanitize_pasted(html, true);
                let range = self.take_selection();
                let end = self.document.insert_html(range.start, &filtered);
                self.set_caret(end);
            }
            (None, Some(text)) => self.insert_plain(text),
            (None, None) => {}
        }
    }

    fn insert_plain(&mut self, text: &str) {
        let range = self.take_selection();
        let mut format = self.document.char_format_at(range.start);
        format.anchor = None;
        format.anchor_names = None;
        let end = self.document.insert_text(range.start, text, &format);
        self.set_caret(end);
    }

    /// Remove the selected text and return where it was.
    fn take_selection(&mut self) -> Range<usize> {
        let range = self.text_cursor();
        if !range.is_empty() {
            self.document.remove(range.clone());
        }
        range
    }

    /// Find `needle` and select the match.
    ///
    /// `reverse` searches backward from the selection start, `next` forward
    /// from the selection end, otherwise forward from the selection start.
    /// When nothing is found the search wraps around once. Returns `None`
    /// and leaves the selection untouched if there is no match at all.
    pub fn search(&mut self, needle: &str, next: bool, reverse: bool) -> Option<Range<usize>> {
        let (from, direction) = if reverse {
            (self.selection_start, Direction::Backward)
        } else if next {
            (self.selection_end, Direction::Forward)
        } else {
            (self.selection_start, Direction::Forward)
        };
        let found = self.document.find(needle, from, direction).or_else(|| {
            let restart = match direction {
                Direction::Forward => 0,
                Direction::Backward => self.document.len() + 1,
            };
            self.document.find(needle, restart, direction)
        })?;
        self.select(found.clone());
        Some(found)
    }

    /// All markers, rescanning the document first if it changed.
    pub fn markers(&mut self) -> &[Marker] {
        self.markers.refresh(&self.document);
        self.markers.markers()
    }

    pub fn markers_dirty(&self) -> bool {
        self.markers.is_dirty()
    }

    pub fn next_marker(&mut self, position: usize) -> usize {
        self.markers.next_marker(&self.document, position)
    }

    pub fn previous_marker(&mut self, position: usize) -> usize {
        self.markers.previous_marker(&self.document, position)
    }
}
