//! Inline HTML subset reader and writer.
//!
//! Understands the small set of markup the teleprompter document carries:
//! paragraphs and line breaks, bold/italic/underline/strike, fonts and
//! colours, alignment, and `<a name>` anchors (cue markers). Everything else
//! is read as plain text inside its parent format.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Alignment, Block, CharFormat, Color, TextRun};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>")
        .expect("valid token regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "tr", "table",
    "ul", "ol", "center",
];
const VOID_TAGS: &[&str] = &["br", "hr", "img", "meta", "link", "input", "col", "wbr", "base"];
const SKIPPED_TAGS: &[&str] = &["head", "style", "script", "title"];

/// Read `html` into document blocks. Always returns at least one block.
pub fn read(html: &str) -> Vec<Block> {
    let mut reader = Reader::default();
    let mut last = 0;
    for caps in TOKEN.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        reader.text(&html[last..whole.start()]);
        last = whole.end();
        let Some(name) = caps.get(2) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            reader.close(&name);
        } else {
            reader.open(&name, attrs);
        }
    }
    reader.text(&html[last..]);
    reader.finish()
}

#[derive(Debug)]
struct Frame {
    tag: String,
    format: CharFormat,
}

#[derive(Debug, Default)]
struct Reader {
    blocks: Vec<Block>,
    current: Block,
    started: bool,
    last_space: bool,
    stack: Vec<Frame>,
    skip_depth: usize,
}

impl Reader {
    fn format(&self) -> CharFormat {
        self.stack
            .last()
            .map(|frame| frame.format.clone())
            .unwrap_or_default()
    }

    fn open(&mut self, tag: &str, attrs: &str) {
        if SKIPPED_TAGS.contains(&tag) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match tag {
            "br" => {
                self.break_block(true);
                self.started = true;
            }
            "hr" => self.break_block(false),
            _ if BLOCK_TAGS.contains(&tag) => {
                if !self.current.is_empty() {
                    self.break_block(false);
                }
                self.started = true;
                if let Some(alignment) = block_alignment(tag, attrs) {
                    self.current.format.alignment = Some(alignment);
                }
            }
            _ => {}
        }
        if VOID_TAGS.contains(&tag) || attrs.trim_end().ends_with('/') {
            return;
        }
        let mut format = self.format();
        format.merge(&tag_format(tag, attrs));
        self.stack.push(Frame {
            tag: tag.to_string(),
            format,
        });
    }

    fn close(&mut self, tag: &str) {
        if SKIPPED_TAGS.contains(&tag) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        if let Some(idx) = self.stack.iter().rposition(|frame| frame.tag == tag) {
            self.stack.truncate(idx);
        }
        if BLOCK_TAGS.contains(&tag) {
            self.break_block(false);
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skip_depth > 0 || raw.is_empty() {
            return;
        }
        let decoded = html_escape::decode_html_entities(raw);
        let mut out = String::with_capacity(decoded.len());
        for ch in decoded.chars() {
            if ch.is_ascii_whitespace() {
                if !self.last_space && (!self.current.is_empty() || !out.is_empty()) {
                    out.push(' ');
                    self.last_space = true;
                }
                continue;
            }
            self.last_space = false;
            out.push(ch);
        }
        if out.is_empty() {
            return;
        }
        let format = self.format();
        self.current.runs.push(TextRun::new(out, format));
        self.current.normalize();
    }

    /// Finish the current block. Empty blocks are kept only when an element
    /// explicitly opened them or `force` is set.
    fn break_block(&mut self, force: bool) {
        self.last_space = false;
        if !force && !self.started && self.current.is_empty() {
            return;
        }
        let block = take_trimmed(&mut self.current);
        self.blocks.push(block);
        self.started = false;
    }

    fn finish(mut self) -> Vec<Block> {
        if self.started || !self.current.is_empty() || self.blocks.is_empty() {
            let block = take_trimmed(&mut self.current);
            self.blocks.push(block);
        }
        self.blocks
    }
}

/// Take the block, dropping the collapsed space left at its end.
fn take_trimmed(block: &mut Block) -> Block {
    let mut block = std::mem::take(block);
    if let Some(run) = block.runs.last_mut()
        && run.text.ends_with(' ')
    {
        run.text.pop();
    }
    block.normalize();
    block
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?;
        if !key.as_str().eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));
        Some(
            value
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default(),
        )
    })
}

fn style_declarations(attrs: &str) -> Vec<(String, String)> {
    attribute(attrs, "style")
        .map(|style| {
            style
                .split(';')
                .filter_map(|decl| {
                    let (prop, value) = decl.split_once(':')?;
                    Some((prop.trim().to_ascii_lowercase(), value.trim().to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn block_alignment(tag: &str, attrs: &str) -> Option<Alignment> {
    if tag == "center" {
        return Some(Alignment::Center);
    }
    style_declarations(attrs)
        .iter()
        .rev()
        .find(|(prop, _)| prop == "text-align")
        .and_then(|(_, value)| Alignment::parse(value))
        .or_else(|| attribute(attrs, "align").and_then(|value| Alignment::parse(&value)))
}

fn tag_format(tag: &str, attrs: &str) -> CharFormat {
    let mut format = CharFormat::default();
    match tag {
        "b" | "strong" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => format.bold = Some(true),
        "i" | "em" | "cite" => format.italic = Some(true),
        "u" | "ins" => format.underline = Some(true),
        "s" | "strike" | "del" => format.strike = Some(true),
        "a" => {
            if let Some(name) = attribute(attrs, "name") {
                format.anchor = Some(true);
                format.anchor_names = Some(name.split_whitespace().map(str::to_string).collect());
            }
        }
        "font" => {
            format.font_family = attribute(attrs, "face");
            format.foreground = attribute(attrs, "color").and_then(|c| Color::parse(&c));
        }
        _ => {}
    }
    for (prop, value) in style_declarations(attrs) {
        apply_style(&mut format, &prop, &value);
    }
    format
}

fn apply_style(format: &mut CharFormat, prop: &str, value: &str) {
    let lower = value.to_ascii_lowercase();
    match prop {
        "font-weight" => {
            format.bold = match lower.as_str() {
                "bold" | "bolder" => Some(true),
                "normal" | "lighter" => Some(false),
                weight => weight.parse::<u16>().ok().map(|w| w >= 600),
            };
        }
        "font-style" => format.italic = Some(lower == "italic" || lower == "oblique"),
        "text-decoration" | "text-decoration-line" => {
            if lower.contains("none") {
                format.underline = Some(false);
                format.strike = Some(false);
                format.overline = Some(false);
            }
            if lower.contains("underline") {
                format.underline = Some(true);
            }
            if lower.contains("line-through") {
                format.strike = Some(true);
            }
            if lower.contains("overline") {
                format.overline = Some(true);
            }
        }
        "color" => {
            if let Some(color) = Color::parse(value) {
                format.foreground = Some(color);
            }
        }
        "font-family" => {
            let family = value
                .split(',')
                .next()
                .map(|f| f.trim().trim_matches(|c| c == '\'' || c == '"'))
                .unwrap_or_default();
            if !family.is_empty() {
                format.font_family = Some(family.to_string());
            }
        }
        "font-size" => {
            if let Some(points) = lower
                .strip_suffix("pt")
                .and_then(|n| n.trim().parse::<f32>().ok())
            {
                format.font_size = Some(points.round().max(1.0) as u32);
            }
        }
        _ => {}
    }
}

/// Write blocks as an HTML document that [`read`] understands.
pub fn write(blocks: &[Block]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html><body>\n");
    for block in blocks {
        match block.format.alignment {
            Some(alignment) if alignment != Alignment::Left => {
                out.push_str(&format!("<p style=\"text-align:{}\">", alignment.as_css()));
            }
            _ => out.push_str("<p>"),
        }
        for run in &block.runs {
            write_run(&mut out, run);
        }
        out.push_str("</p>\n");
    }
    out.push_str("</body></html>\n");
    out
}

fn write_run(out: &mut String, run: &TextRun) {
    let format = &run.format;
    let mut style = Vec::new();
    if let Some(family) = &format.font_family {
        style.push(format!("font-family:'{family}'"));
    }
    if let Some(size) = format.font_size {
        style.push(format!("font-size:{size}pt"));
    }
    if let Some(bold) = format.bold {
        style.push(format!("font-weight:{}", if bold { 700 } else { 400 }));
    }
    if let Some(italic) = format.italic {
        style.push(format!("font-style:{}", if italic { "italic" } else { "normal" }));
    }
    let mut decorations = Vec::new();
    if format.is_underline() {
        decorations.push("underline");
    }
    if format.is_overline() {
        decorations.push("overline");
    }
    if format.is_strike() {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        style.push(format!("text-decoration:{}", decorations.join(" ")));
    }
    if let Some(color) = format.foreground {
        style.push(format!("color:{color}"));
    }

    if format.is_anchor() {
        let names = html_escape::encode_double_quoted_attribute(&format.anchor_names().join(" "))
            .into_owned();
        out.push_str(&format!("<a name=\"{names}\">"));
    }
    if !style.is_empty() {
        let style = html_escape::encode_double_quoted_attribute(&style.join(";")).into_owned();
        out.push_str(&format!("<span style=\"{style}\">"));
    }
    out.push_str(&html_escape::encode_text(&run.text));
    if !style.is_empty() {
        out.push_str("</span>");
    }
    if format.is_anchor() {
        out.push_str("</a>");
    }
}
