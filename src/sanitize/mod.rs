//! Paste and import sanitizing.
//!
//! Imported markup carries styling that fights the editor's own formatting
//! model. The pipeline strips, in order:
//! 1. every `font-size` declaration with an absolute unit
//! 2. background colours on every element except `span` (highlights)
//! 3. optionally, black or near-black text colours
//!
//! Which policy applies to (3) depends on where the markup came from: native
//! office suites already handle default colours, web editors tend to force
//! black text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

static OFFICE_GENERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta\s*name="?generator"?\s*content="(?:(?:libre|open)office|microsoft)"#,
    )
    .expect("valid generator regex")
});

/// Google Docs tags its clipboard content with this id prefix.
const WEB_EDITOR_MARKER: &str = r#"id="docs-internal-guid-"#;

static FONT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9_-]*font-size\s*:\s*\d+(?:\.\d+)?\s*(?:px|pt|em|ex)\s*(?:;\s*)?")
        .expect("valid font-size regex")
});

static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("valid tag regex")
});

static BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    // Parenthesized groups are taken whole so quoted `url(...)` values go too.
    Regex::new(
        r#"(?i)([a-z0-9_-]*)background(?:-color)?\s*:\s*(?:[^;"'>()]|\([^)>]*\))*(?:;\s*)?"#,
    )
    .expect("valid background regex")
});

static DARK_TEXT_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?ix)
        ([a-z0-9_-]*)color \s* : \s*
        (?:
            rgba?\( \s* \d{1,2} \s* , \s* \d{1,2} \s* , \s* \d{1,2} \s*
                (?: , \s* [01]? (?:\.\d+)? \s* )? \)
          | black
          | windowtext
          | \#0{3}(?:0{3})?
        )
        \s*
        (;\s* | ["'}] | $)
        "#,
    )
    .expect("valid text color regex")
});

/// Vendor-prefixed foreground colour Microsoft Office emits next to `color`.
const OFFICE_TEXT_FILL_PREFIX: &str = "mso-style-textfill-fill-";

/// Detected authoring software of pasted markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// LibreOffice, OpenOffice or desktop Microsoft Office
    Office,
    /// Web editors such as Google Docs
    Web,
}

impl Origin {
    /// Whether black text colours should be dropped for this origin.
    pub const fn ignores_black_text(self) -> bool {
        match self {
            Self::Office => false,
            Self::Web => true,
        }
    }
}

/// Identify where `html` came from, if it carries a known signature.
pub fn classify_origin(html: &str) -> Option<Origin> {
    if OFFICE_GENERATOR.is_match(html) {
        Some(Origin::Office)
    } else if html.contains(WEB_EDITOR_MARKER) {
        Some(Origin::Web)
    } else {
        None
    }
}

/// Sanitize clipboard markup, picking the black-text policy from its origin
/// and falling back to `ignore_black_text` when the origin is unknown.
pub fn sanitize_pasted(html: &str, ignore_black_text: bool) -> String {
    let origin = classify_origin(html);
    let ignore_black_text = origin.map_or(ignore_black_text, Origin::ignores_black_text);
    debug!(?origin, ignore_black_text, "sanitizing pasted html");
    sanitize(html, ignore_black_text)
}

/// Strip styling that would override the editor's own formatting.
pub fn sanitize(html: &str, ignore_black_text: bool) -> String {
    let html = FONT_SIZE.replace_all(html, "");
    let html = strip_backgrounds(&html);
    if ignore_black_text {
        strip_dark_text_colors(&html).into_owned()
    } else {
        html.into_owned()
    }
}

fn strip_backgrounds(html: &str) -> Cow<'_, str> {
    OPENING_TAG.replace_all(html, |caps: &Captures<'_>| {
        let name = &caps[1];
        if name.eq_ignore_ascii_case("span") {
            return caps[0].to_string();
        }
        let attrs = BACKGROUND.replace_all(&caps[2], |decl: &Captures<'_>| {
            // Longer property names such as `mso-background` are left alone.
            if decl[1].is_empty() {
                String::new()
            } else {
                decl[0].to_string()
            }
        });
        format!("<{name}{attrs}>")
    })
}

fn strip_dark_text_colors(html: &str) -> Cow<'_, str> {
    DARK_TEXT_COLOR.replace_all(html, |caps: &Captures<'_>| {
        let prefix = &caps[1];
        if !prefix.is_empty() && !prefix.eq_ignore_ascii_case(OFFICE_TEXT_FILL_PREFIX) {
            // background-color, border-color and friends
            return caps[0].to_string();
        }
        let terminator = &caps[2];
        if terminator.starts_with(';') {
            String::new()
        } else {
            terminator.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_background_is_kept_as_highlight() {
        let html = r#"<span style="background-color:#ffff00">highlighted</span>"#;
        assert_eq!(sanitize(html, false), html);
    }

    #[test]
    fn test_container_background_is_removed() {
        let html = r#"<div style="background-color:#ffffff">x</div>"#;
        assert_eq!(sanitize(html, false), r#"<div style="">x</div>"#);
    }

    #[test]
    fn test_black_text_and_font_size_removed() {
        let html = r#"<p style="color:rgb(0,0,0); font-size:12pt;">Hello</p>"#;
        let out = sanitize(html, true);
        assert!(!out.contains("font-size"), "{out}");
        assert!(!out.contains("color"), "{out}");
        assert!(out.contains(">Hello</p>"));
    }

    #[test]
    fn test_black_text_kept_when_policy_disabled() {
        let html = r#"<p style="color:#000000">Hello</p>"#;
        assert_eq!(sanitize(html, false), html);
    }

    #[test]
    fn test_colored_text_is_kept() {
        let html = r#"<p style="color:rgb(200,0,0); font-weight:bold">x</p>"#;
        assert_eq!(sanitize(html, true), html);
    }

    #[test]
    fn test_dark_text_variants_removed() {
        for value in ["black", "WindowText", "#000", "#000000", "rgba(10, 20, 30, 1)"] {
            let html = format!(r#"<span style="font-weight:bold; color:{value}">x</span>"#);
            assert_eq!(
                sanitize(&html, true),
                r#"<span style="font-weight:bold; ">x</span>"#,
                "value {value}"
            );
        }
    }

    #[test]
    fn test_office_text_fill_color_removed() {
        let html = r#"<span style="mso-style-textfill-fill-color:#000000;color:black">x</span>"#;
        assert_eq!(sanitize(html, true), r#"<span style="">x</span>"#);
    }

    #[test]
    fn test_background_color_is_not_mistaken_for_text_color() {
        let html = r#"<span style="background-color:black; border-color:#000">x</span>"#;
        assert_eq!(sanitize(html, true), html);
    }

    #[test]
    fn test_font_size_units() {
        let html = r#"<p style="font-size:1.5em; margin:0"><span style="font-size: 14px">a</span></p>"#;
        assert_eq!(
            sanitize(html, false),
            r#"<p style="margin:0"><span style="">a</span></p>"#
        );
    }

    #[test]
    fn test_font_size_in_stylesheet_removed() {
        let html = "<style>p { font-size: 11pt; line-height: 1 }</style>";
        assert_eq!(sanitize(html, false), "<style>p { line-height: 1 }</style>");
    }

    #[test]
    fn test_non_span_elements_lose_background_shorthand() {
        let html = r#"<td style="background:#ccc; width:10px"><SPAN style="background:#ff0">h</SPAN></td>"#;
        assert_eq!(
            sanitize(html, false),
            r#"<td style="width:10px"><SPAN style="background:#ff0">h</SPAN></td>"#
        );
    }

    #[test]
    fn test_background_with_quoted_url_removed_whole() {
        let html = r#"<div style="background:url('x.png') no-repeat; width:1px">t</div>"#;
        assert_eq!(sanitize(html, false), r#"<div style="width:1px">t</div>"#);
        assert_eq!(sanitize(html, true), r#"<div style="width:1px">t</div>"#);
    }

    #[test]
    fn test_background_value_stays_inside_its_attribute() {
        let html = r#"<div style="background:red" class="x">t</div>"#;
        assert_eq!(sanitize(html, false), r#"<div style="" class="x">t</div>"#);
    }

    #[test]
    fn test_removed_color_does_not_join_neighbours() {
        let html = r#"<div style="back color:black;ground:red">t</div>"#;
        let once = sanitize(html, true);
        assert_eq!(once, r#"<div style="back ground:red">t</div>"#);
        assert_eq!(sanitize(&once, true), once);
    }

    #[test]
    fn test_classify_origin() {
        let libre = r#"<meta name="generator" content="LibreOffice 7.5"/>"#;
        let word = r#"<META NAME="Generator" CONTENT="Microsoft Word 15">"#;
        let gdocs = r#"<b style="font-weight:normal;" id="docs-internal-guid-1234">x</b>"#;
        assert_eq!(classify_origin(libre), Some(Origin::Office));
        assert_eq!(classify_origin(word), Some(Origin::Office));
        assert_eq!(classify_origin(gdocs), Some(Origin::Web));
        assert_eq!(classify_origin("<p>plain</p>"), None);
    }

    #[test]
    fn test_sanitize_pasted_uses_origin_policy() {
        let office = r#"<meta name="generator" content="LibreOffice"><p style="color:#000000">x</p>"#;
        assert!(sanitize_pasted(office, true).contains("color:#000000"));

        let unknown = r#"<p style="color:#000000">x</p>"#;
        assert!(!sanitize_pasted(unknown, true).contains("color"));
        assert!(sanitize_pasted(unknown, false).contains("color"));
    }

    #[test]
    fn test_input_without_targets_is_unchanged() {
        let html = "<p><b>bold</b> text</p>";
        assert_eq!(sanitize(html, true), html);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn declaration() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("font-size:12pt".to_string()),
                Just("font-size: 1.5em".to_string()),
                Just("background-color:#fff".to_string()),
                Just("background:rgb(1,2,3)".to_string()),
                Just("background:url('bg.png') no-repeat".to_string()),
                Just("back".to_string()),
                Just("ground:red".to_string()),
                Just("color:black".to_string()),
                Just("color:rgb(200, 10, 10)".to_string()),
                Just("color:#000".to_string()),
                Just("mso-style-textfill-fill-color:windowtext".to_string()),
                Just("font-weight:bold".to_string()),
                Just("border-color:#000".to_string()),
            ]
        }

        fn element() -> impl Strategy<Value = String> {
            (
                prop_oneof![Just("p"), Just("span"), Just("div"), Just("td")],
                proptest::collection::vec(declaration(), 0..5),
                prop_oneof![Just("; "), Just(";"), Just(" ;")],
            )
                .prop_map(|(tag, decls, sep)| {
                    format!(r#"<{tag} style="{}">text</{tag}>"#, decls.join(sep))
                })
        }

        proptest! {
            #[test]
            fn sanitize_is_idempotent(
                parts in proptest::collection::vec(element(), 1..6),
                ignore_black_text in any::<bool>(),
            ) {
                let html = parts.concat();
                let once = sanitize(&html, ignore_black_text);
                let twice = sanitize(&once, ignore_black_text);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
