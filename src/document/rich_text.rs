//! In-memory rich text document.

use std::fmt;
use std::ops::Range;

use super::html;
use super::types::{Block, BlockFormat, Blocks, CharFormat, ContentsChange, TextRun};
use super::{ChangeListener, RichText};
use crate::search::{self, Direction};

/// A rich text document: paragraphs of formatted text runs.
///
/// Positions count characters, with one position per paragraph separator,
/// so `plain_text()` indexes line up with document positions. Every mutation
/// notifies the subscribed listeners and sets the modified flag.
pub struct RichTextDocument {
    /// Never empty
    blocks: Vec<Block>,
    listeners: Vec<ChangeListener>,
    modified: bool,
}

impl fmt::Debug for RichTextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextDocument")
            .field("blocks", &self.blocks)
            .field("listeners", &self.listeners.len())
            .field("modified", &self.modified)
            .finish()
    }
}

impl Default for RichTextDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RichTextDocument {
    /// Create an empty document with a single empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
            listeners: Vec::new(),
            modified: false,
        }
    }

    pub fn from_plain_text(text: &str) -> Self {
        Self::from_blocks(plain_blocks(text, &CharFormat::default()))
    }

    pub fn from_html(markup: &str) -> Self {
        Self::from_blocks(html::read(markup))
    }

    fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self::new();
        if !blocks.is_empty() {
            doc.blocks = blocks;
        }
        doc
    }

    /// Total length in positions, including paragraph separators.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Block::len).sum::<usize>() + self.blocks.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The document text with paragraphs joined by `'\n'`.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_html(&self) -> String {
        html::write(&self.blocks)
    }

    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub const fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Block index and in-block offset for a position, clamped to the end.
    fn locate(&self, position: usize) -> (usize, usize) {
        let mut start = 0;
        for (idx, block) in self.blocks.iter().enumerate() {
            let len = block.len();
            if position <= start + len {
                return (idx, position - start);
            }
            start += len + 1;
        }
        let last = self.blocks.len() - 1;
        (last, self.blocks[last].len())
    }

    fn clamp(&self, range: &Range<usize>) -> Range<usize> {
        let end = range.end.min(self.len());
        range.start.min(end)..end
    }

    /// Character format of the character before `position`.
    pub fn char_format_at(&self, position: usize) -> CharFormat {
        let (idx, offset) = self.locate(position);
        self.blocks[idx].format_at(offset)
    }

    /// Paragraph format of the block containing `position`.
    pub fn block_format_at(&self, position: usize) -> BlockFormat {
        self.blocks[self.locate(position).0].format
    }

    /// The range of the word touching `position`; empty between words.
    pub fn word_at(&self, position: usize) -> Range<usize> {
        let chars: Vec<char> = self.plain_text().chars().collect();
        let position = position.min(chars.len());
        let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
        let mut start = position;
        while start > 0 && is_word(chars[start - 1]) {
            start -= 1;
        }
        let mut end = position;
        while end < chars.len() && is_word(chars[end]) {
            end += 1;
        }
        start..end
    }

    pub fn find(&self, needle: &str, from: usize, direction: Direction) -> Option<Range<usize>> {
        search::find(&self.plain_text(), needle, from, direction)
    }

    /// Insert plain text with `format`; `'\n'` starts a new paragraph.
    /// Returns the position after the inserted text.
    pub fn insert_text(&mut self, position: usize, text: &str, format: &CharFormat) -> usize {
        let position = position.min(self.len());
        position + self.insert_blocks(position, plain_blocks(text, format))
    }

    /// Insert markup read with the inline HTML reader.
    /// Returns the position after the inserted content.
    pub fn insert_html(&mut self, position: usize, markup: &str) -> usize {
        let position = position.min(self.len());
        position + self.insert_blocks(position, html::read(markup))
    }

    fn insert_blocks(&mut self, position: usize, blocks: Vec<Block>) -> usize {
        let added = blocks.iter().map(Block::len).sum::<usize>() + blocks.len().saturating_sub(1);
        if added == 0 {
            return 0;
        }
        let (idx, offset) = self.locate(position);
        let mut incoming = blocks.into_iter();
        let Some(first) = incoming.next() else {
            return 0;
        };
        let mut rest: Vec<Block> = incoming.collect();
        if rest.is_empty() {
            self.blocks[idx].insert_runs(offset, first.runs);
        } else {
            let tail = self.blocks[idx].split_off(offset);
            self.blocks[idx].runs.extend(first.runs);
            self.blocks[idx].normalize();
            if let Some(last) = rest.last_mut() {
                last.runs.extend(tail.runs);
                last.normalize();
                if last.format.alignment.is_none() {
                    last.format = tail.format;
                }
            }
            self.blocks.splice(idx + 1..idx + 1, rest);
        }
        self.notify(ContentsChange {
            position,
            removed: 0,
            added,
        });
        added
    }

    /// Remove the characters in `range`, joining paragraphs it spans.
    pub fn remove(&mut self, range: Range<usize>) {
        let range = self.clamp(&range);
        if range.is_empty() {
            return;
        }
        let (start_block, start_offset) = self.locate(range.start);
        let (end_block, end_offset) = self.locate(range.end);
        if start_block == end_block {
            self.blocks[start_block].remove_range(start_offset, end_offset);
        } else {
            let len = self.blocks[start_block].len();
            self.blocks[start_block].remove_range(start_offset, len);
            let tail = self.blocks[end_block].split_off(end_offset);
            self.blocks.drain(start_block + 1..=end_block);
            self.blocks[start_block].runs.extend(tail.runs);
            self.blocks[start_block].normalize();
        }
        self.notify(ContentsChange {
            position: range.start,
            removed: range.len(),
            added: 0,
        });
    }

    /// Merge `format` onto every character in `range`.
    pub fn merge_char_format(&mut self, range: Range<usize>, format: &CharFormat) {
        let range = self.clamp(&range);
        if range.is_empty() {
            return;
        }
        let mut block_start = 0;
        for block in &mut self.blocks {
            if block_start >= range.end {
                break;
            }
            let len = block.len();
            let block_end = block_start + len;
            if block_end >= range.start {
                let from = range.start.saturating_sub(block_start);
                let to = (range.end - block_start).min(len);
                block.merge_format(from, to, format);
            }
            block_start = block_end + 1;
        }
        self.notify(ContentsChange {
            position: range.start,
            removed: range.len(),
            added: range.len(),
        });
    }

    /// Merge `format` onto every paragraph touched by `range`.
    pub fn merge_block_format(&mut self, range: Range<usize>, format: &BlockFormat) {
        let range = self.clamp(&range);
        let first = self.locate(range.start).0;
        let last = self.locate(range.end).0;
        for block in &mut self.blocks[first..=last] {
            block.format.merge(format);
        }
        self.notify(ContentsChange {
            position: range.start,
            removed: range.len(),
            added: range.len(),
        });
    }

    /// Replace the whole content with plain text.
    pub fn set_plain_text(&mut self, text: &str) {
        self.replace_all(plain_blocks(text, &CharFormat::default()));
    }

    /// Replace the whole content with markup.
    pub fn set_html(&mut self, markup: &str) {
        self.replace_all(html::read(markup));
    }

    fn replace_all(&mut self, blocks: Vec<Block>) {
        let removed = self.len();
        self.blocks = if blocks.is_empty() {
            vec![Block::default()]
        } else {
            blocks
        };
        let added = self.len();
        self.notify(ContentsChange {
            position: 0,
            removed,
            added,
        });
    }

    fn notify(&mut self, change: ContentsChange) {
        self.modified = true;
        self.listeners.retain_mut(|listener| listener(&change));
    }
}

impl RichText for RichTextDocument {
    fn blocks(&self) -> Blocks<'_> {
        Blocks::new(&self.blocks)
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

fn plain_blocks(text: &str, format: &CharFormat) -> Vec<Block> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| Block::from_run(TextRun::new(line, format.clone())))
        .collect()
}
