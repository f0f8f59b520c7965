use crate::document::{Alignment, BlockFormat, CharFormat, Color};

use super::DocumentHandler;

const MARKER_NAME: &str = "marker";

impl DocumentHandler {
    /// Character format at the caret, or at the end of the selection.
    pub fn current_format(&self) -> CharFormat {
        self.document.char_format_at(self.text_cursor().end)
    }

    pub fn bold(&self) -> bool {
        self.current_format().is_bold()
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.merge_format_on_word_or_selection(&CharFormat {
            bold: Some(bold),
            ..CharFormat::default()
        });
    }

    pub fn italic(&self) -> bool {
        self.current_format().is_italic()
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.merge_format_on_word_or_selection(&CharFormat {
            italic: Some(italic),
            ..CharFormat::default()
        });
    }

    pub fn underline(&self) -> bool {
        self.current_format().is_underline()
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.merge_format_on_word_or_selection(&CharFormat {
            underline: Some(underline),
            ..CharFormat::default()
        });
    }

    pub fn strike(&self) -> bool {
        self.current_format().is_strike()
    }

    pub fn set_strike(&mut self, strike: bool) {
        self.merge_format_on_word_or_selection(&CharFormat {
            strike: Some(strike),
            ..CharFormat::default()
        });
    }

    /// Whether the caret sits in a marker.
    pub fn marker(&self) -> bool {
        self.current_format().is_anchor()
    }

    /// Turn the selection (or word) into a cue marker, or clear it.
    ///
    /// Markers are drawn underlined and overlined; the overline is what tells
    /// them apart from ordinary underlined text.
    pub fn set_marker(&mut self, marker: bool) {
        let names = if marker {
            vec![MARKER_NAME.to_string()]
        } else {
            Vec::new()
        };
        self.merge_format_on_word_or_selection(&CharFormat {
            anchor: Some(marker),
            underline: Some(marker),
            overline: Some(marker),
            anchor_names: Some(names),
            ..CharFormat::default()
        });
        self.markers.mark_dirty();
    }

    pub fn font_family(&self) -> Option<String> {
        self.current_format().font_family
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.merge_format_on_word_or_selection(&CharFormat {
            font_family: Some(family.to_string()),
            ..CharFormat::default()
        });
    }

    /// Point size at the caret, if one is set.
    pub fn font_size(&self) -> Option<u32> {
        self.current_format().font_size
    }

    /// Set the point size; zero is ignored, as is a size already in effect.
    pub fn set_font_size(&mut self, size: u32) {
        if size == 0 {
            return;
        }
        let range = self.word_or_selection();
        if self.document.char_format_at(range.end).font_size == Some(size) {
            return;
        }
        self.document.merge_char_format(
            range,
            &CharFormat {
                font_size: Some(size),
                ..CharFormat::default()
            },
        );
    }

    /// Foreground colour at the caret; white when none is set.
    pub fn text_color(&self) -> Color {
        self.current_format().foreground.unwrap_or(Color::WHITE)
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.merge_format_on_word_or_selection(&CharFormat {
            foreground: Some(color),
            ..CharFormat::default()
        });
    }

    pub fn alignment(&self) -> Alignment {
        self.document
            .block_format_at(self.text_cursor().end)
            .alignment
            .unwrap_or_default()
    }

    /// Align every paragraph touched by the selection.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        let range = self.text_cursor();
        self.document.merge_block_format(
            range,
            &BlockFormat {
                alignment: Some(alignment),
            },
        );
    }
}
