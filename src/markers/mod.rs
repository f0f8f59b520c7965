//! Cue marker index.
//!
//! Markers are anchor runs in the document (named annotations used as
//! teleprompter cue points). The index is derived state: it subscribes to the
//! document's change notification, goes dirty on any mutation and is rebuilt
//! with one full scan the next time navigation needs it.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::debug;

use crate::document::RichText;

/// One anchor run found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Start of the run in document positions
    pub position: usize,
    /// Names attached to the anchor; empty for an unnamed marker
    pub names: Vec<String>,
    /// Text covered by the run
    pub text: String,
}

impl Marker {
    pub fn is_named(&self) -> bool {
        !self.names.is_empty()
    }
}

/// Shared dirty flag, set from the document's change listener.
#[derive(Debug, Clone)]
struct DirtyFlag(Rc<Cell<bool>>);

impl DirtyFlag {
    fn new(dirty: bool) -> Self {
        Self(Rc::new(Cell::new(dirty)))
    }

    fn get(&self) -> bool {
        self.0.get()
    }

    fn set(&self, dirty: bool) {
        self.0.set(dirty);
    }

    fn downgrade(&self) -> Weak<Cell<bool>> {
        Rc::downgrade(&self.0)
    }
}

/// Position-ordered markers of one document.
#[derive(Debug, Clone)]
pub struct MarkerIndex {
    markers: Vec<Marker>,
    dirty: DirtyFlag,
}

impl Default for MarkerIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerIndex {
    /// Create a detached, dirty index.
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            dirty: DirtyFlag::new(true),
        }
    }

    /// Create an index that goes dirty whenever `document` changes.
    ///
    /// The listener only holds a weak reference: once the index and its
    /// clones are dropped, the document drops the listener on its next change.
    pub fn attach<D: RichText + ?Sized>(document: &mut D) -> Self {
        let index = Self::new();
        let flag = index.dirty.downgrade();
        document.subscribe(Box::new(move |_| {
            let Some(dirty) = flag.upgrade() else {
                return false;
            };
            dirty.set(true);
            true
        }));
        index
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn mark_clean(&self) {
        self.dirty.set(false);
    }

    /// Discard all markers and rescan `document`.
    pub fn rebuild<D: RichText + ?Sized>(&mut self, document: &D) {
        self.markers.clear();
        for block in document.blocks() {
            for fragment in block.fragments() {
                if fragment.format.is_anchor() {
                    self.markers.push(Marker {
                        position: fragment.position,
                        names: fragment.format.anchor_names().to_vec(),
                        text: fragment.text.to_string(),
                    });
                }
            }
        }
        self.mark_clean();
        debug!(markers = self.markers.len(), "rebuilt marker index");
    }

    /// Rebuild if a change happened since the last scan.
    pub fn refresh<D: RichText + ?Sized>(&mut self, document: &D) {
        if self.is_dirty() {
            self.rebuild(document);
        }
    }

    /// Markers from the last scan, in position order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Position of the first marker after `position`, wrapping around to the
    /// first marker. Returns `position` when there are no markers.
    pub fn next_marker<D: RichText + ?Sized>(&mut self, document: &D, position: usize) -> usize {
        self.refresh(document);
        self.next_position(position)
    }

    /// Position of the last marker before `position`, wrapping around to the
    /// last marker. Returns `position` when there are no markers.
    pub fn previous_marker<D: RichText + ?Sized>(
        &mut self,
        document: &D,
        position: usize,
    ) -> usize {
        self.refresh(document);
        self.previous_position(position)
    }

    fn next_position(&self, position: usize) -> usize {
        let idx = self.markers.partition_point(|m| m.position <= position);
        self.markers
            .get(idx)
            .or_else(|| self.markers.first())
            .map_or(position, |m| m.position)
    }

    fn previous_position(&self, position: usize) -> usize {
        let idx = self.markers.partition_point(|m| m.position < position);
        idx.checked_sub(1)
            .and_then(|i| self.markers.get(i))
            .or_else(|| self.markers.last())
            .map_or(position, |m| m.position)
    }
}
