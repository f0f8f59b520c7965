//! Core document types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An sRGB text colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or one of a few colour names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = args.split(',').map(|c| c.trim().parse::<u8>().ok());
            let r = channels.next()??;
            let g = channels.next()??;
            let b = channels.next()??;
            return Some(Self::rgb(r, g, b));
        }
        match lower.as_str() {
            "black" | "windowtext" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::rgb(255, 0, 0)),
            "green" => Some(Self::rgb(0, 128, 0)),
            "blue" => Some(Self::rgb(0, 0, 255)),
            "yellow" => Some(Self::rgb(255, 255, 0)),
            "lightblue" => Some(Self::rgb(173, 216, 230)),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            _ => None,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                let v = ch.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Color::rgb(out[0], out[1], out[2]))
        }
        6 => Some(Color::rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl Alignment {
    /// Parse a CSS `text-align` value or an HTML `align` attribute.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "right" | "end" => Some(Self::Right),
            "center" | "middle" => Some(Self::Center),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::Justify => "justify",
        }
    }
}

/// Character formatting of a text run.
///
/// Every field is optional: `None` means "not set here", which lets a partial
/// format be merged onto an existing one field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharFormat {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strike: Option<bool>,
    pub overline: Option<bool>,
    pub foreground: Option<Color>,
    pub anchor: Option<bool>,
    pub anchor_names: Option<Vec<String>>,
}

impl CharFormat {
    /// Overlay every field set in `other` onto `self`.
    pub fn merge(&mut self, other: &Self) {
        fn overlay<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
        overlay(&mut self.font_family, other.font_family.as_ref());
        overlay(&mut self.font_size, other.font_size.as_ref());
        overlay(&mut self.bold, other.bold.as_ref());
        overlay(&mut self.italic, other.italic.as_ref());
        overlay(&mut self.underline, other.underline.as_ref());
        overlay(&mut self.strike, other.strike.as_ref());
        overlay(&mut self.overline, other.overline.as_ref());
        overlay(&mut self.foreground, other.foreground.as_ref());
        overlay(&mut self.anchor, other.anchor.as_ref());
        overlay(&mut self.anchor_names, other.anchor_names.as_ref());
    }

    /// Returns a copy of `self` with `other` merged on top.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    pub fn is_underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    pub fn is_strike(&self) -> bool {
        self.strike.unwrap_or(false)
    }

    pub fn is_overline(&self) -> bool {
        self.overline.unwrap_or(false)
    }

    /// Whether the run is a named annotation (a marker).
    pub fn is_anchor(&self) -> bool {
        self.anchor.unwrap_or(false)
    }

    pub fn anchor_names(&self) -> &[String] {
        self.anchor_names.as_deref().unwrap_or_default()
    }
}

/// Paragraph formatting of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFormat {
    pub alignment: Option<Alignment>,
}

impl BlockFormat {
    pub fn merge(&mut self, other: &Self) {
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
    }
}

/// A maximal run of text sharing one character format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub format: CharFormat,
}

impl TextRun {
    pub fn new(text: impl Into<String>, format: CharFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A paragraph: a block format and its text runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub format: BlockFormat,
    pub runs: Vec<TextRun>,
}

impl Block {
    pub const fn new(format: BlockFormat) -> Self {
        Self {
            format,
            runs: Vec::new(),
        }
    }

    pub fn from_run(run: TextRun) -> Self {
        let mut block = Self::default();
        block.runs.push(run);
        block.normalize();
        block
    }

    /// Length in characters, excluding the block separator.
    pub fn len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Format of the character before `offset`, or of the first character at
    /// the start of the block.
    pub fn format_at(&self, offset: usize) -> CharFormat {
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.len();
            if offset > start && offset <= end {
                return run.format.clone();
            }
            start = end;
        }
        self.runs
            .first()
            .map(|run| run.format.clone())
            .unwrap_or_default()
    }

    /// Make sure a run boundary exists at `offset` and return the index of
    /// the run starting there (`runs.len()` at the end of the block).
    pub(crate) fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for idx in 0..self.runs.len() {
            let len = self.runs[idx].len();
            if offset == start {
                return idx;
            }
            if offset < start + len {
                let byte = char_to_byte(&self.runs[idx].text, offset - start);
                let tail = self.runs[idx].text.split_off(byte);
                let format = self.runs[idx].format.clone();
                self.runs.insert(idx + 1, TextRun::new(tail, format));
                return idx + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Split the block at `offset`, returning the tail as a new block with
    /// the same block format.
    pub(crate) fn split_off(&mut self, offset: usize) -> Self {
        let idx = self.split_at(offset);
        let runs = self.runs.split_off(idx);
        let mut tail = Self {
            format: self.format,
            runs,
        };
        self.normalize();
        tail.normalize();
        tail
    }

    pub(crate) fn insert_runs(&mut self, offset: usize, runs: Vec<TextRun>) {
        let idx = self.split_at(offset);
        self.runs.splice(idx..idx, runs);
        self.normalize();
    }

    pub(crate) fn remove_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        self.runs.drain(first..last);
        self.normalize();
    }

    pub(crate) fn merge_format(&mut self, start: usize, end: usize, format: &CharFormat) {
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        for run in &mut self.runs[first..last] {
            run.format.merge(format);
        }
        self.normalize();
    }

    /// Drop empty runs and coalesce neighbours with equal formats.
    pub(crate) fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.format == run.format => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

pub(crate) fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// A block together with its position in the document.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    position: usize,
    block: &'a Block,
}

impl<'a> BlockRef<'a> {
    pub const fn new(position: usize, block: &'a Block) -> Self {
        Self { position, block }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn format(&self) -> &'a BlockFormat {
        &self.block.format
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn text(&self) -> String {
        self.block.text()
    }

    /// Formatting fragments of this block, in order.
    pub fn fragments(&self) -> Fragments<'a> {
        Fragments {
            position: self.position,
            runs: self.block.runs.iter(),
        }
    }
}

/// A formatting fragment with its absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub position: usize,
    pub text: &'a str,
    pub format: &'a CharFormat,
}

impl Fragment<'_> {
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Iterator over the fragments of one block.
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    position: usize,
    runs: std::slice::Iter<'a, TextRun>,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let run = self.runs.next()?;
        let fragment = Fragment {
            position: self.position,
            text: &run.text,
            format: &run.format,
        };
        self.position += run.len();
        Some(fragment)
    }
}

/// Iterator over the blocks of a document, in document order.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    position: usize,
    blocks: std::slice::Iter<'a, Block>,
}

impl<'a> Blocks<'a> {
    pub fn new(blocks: &'a [Block]) -> Self {
        Self {
            position: 0,
            blocks: blocks.iter(),
        }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = BlockRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.blocks.next()?;
        let block_ref = BlockRef::new(self.position, block);
        // One position for the block separator.
        self.position += block.len() + 1;
        Some(block_ref)
    }
}

/// Describes one document mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsChange {
    /// Position where the change starts
    pub position: usize,
    /// Number of characters removed
    pub removed: usize,
    /// Number of characters added
    pub added: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> CharFormat {
        CharFormat {
            bold: Some(true),
            ..CharFormat::default()
        }
    }

    #[test]
    fn test_color_parse_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#FF0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(Color::parse("Black"), Some(Color::BLACK));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::rgb(171, 205, 239).to_string(), "#abcdef");
    }

    #[test]
    fn test_char_format_merge_overlays_only_set_fields() {
        let mut format = CharFormat {
            bold: Some(true),
            font_size: Some(12),
            ..CharFormat::default()
        };
        format.merge(&CharFormat {
            italic: Some(true),
            font_size: Some(20),
            ..CharFormat::default()
        });
        assert!(format.is_bold());
        assert!(format.is_italic());
        assert_eq!(format.font_size, Some(20));
    }

    #[test]
    fn test_split_at_creates_boundary() {
        let mut block = Block::from_run(TextRun::new("hello", CharFormat::default()));
        assert_eq!(block.split_at(2), 1);
        assert_eq!(block.runs[0].text, "he");
        assert_eq!(block.runs[1].text, "llo");
        assert_eq!(block.split_at(5), 2);
    }

    #[test]
    fn test_merge_format_splits_and_coalesces() {
        let mut block = Block::from_run(TextRun::new("hello world", CharFormat::default()));
        block.merge_format(6, 11, &bold());
        assert_eq!(block.runs.len(), 2);
        assert_eq!(block.runs[1].text, "world");
        assert!(block.runs[1].format.is_bold());

        block.merge_format(0, 6, &bold());
        assert_eq!(block.runs.len(), 1);
        assert_eq!(block.text(), "hello world");
    }

    #[test]
    fn test_format_at_uses_previous_character() {
        let mut block = Block::from_run(TextRun::new("ab", CharFormat::default()));
        block.merge_format(1, 2, &bold());
        assert!(!block.format_at(1).is_bold());
        assert!(block.format_at(2).is_bold());
        assert!(!block.format_at(0).is_bold());
    }

    #[test]
    fn test_blocks_iterator_counts_separators() {
        let blocks = vec![
            Block::from_run(TextRun::new("abc", CharFormat::default())),
            Block::from_run(TextRun::new("de", bold())),
        ];
        let positions: Vec<usize> = Blocks::new(&blocks).map(|b| b.position()).collect();
        assert_eq!(positions, vec![0, 4]);
        let fragment = Blocks::new(&blocks)
            .nth(1)
            .and_then(|b| b.fragments().next())
            .unwrap();
        assert_eq!(fragment.position, 4);
        assert_eq!(fragment.text, "de");
    }

    #[test]
    fn test_multibyte_split() {
        let mut block = Block::from_run(TextRun::new("héllo", CharFormat::default()));
        let tail = block.split_off(2);
        assert_eq!(block.text(), "hé");
        assert_eq!(tail.text(), "llo");
    }
}
