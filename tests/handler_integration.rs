use prompter::document::RichTextDocument;
use prompter::handler::{ClipboardContent, DocumentHandler};
use prompter::import::{ConverterCommand, ConverterSet, ImportFormat, import_external};
use prompter::sanitize::sanitize;

#[test]
fn test_highlight_background_survives_sanitizing() {
    let html = r#"<span style="background-color:#ffff00">highlighted</span>"#;
    assert_eq!(sanitize(html, false), html);
}

#[test]
fn test_container_background_is_dropped() {
    let html = r#"<div style="background-color:#ffffff">x</div>"#;
    let out = sanitize(html, false);
    assert!(!out.contains("background"), "{out}");
    assert!(out.contains(">x</div>"));
}

#[test]
fn test_black_text_and_font_size_are_dropped() {
    let out = sanitize(r#"<p style="color:rgb(0,0,0); font-size:12pt;">Hello</p>"#, true);
    assert!(!out.contains("font-size"));
    assert!(!out.contains("color"));
    assert!(out.contains("Hello"));
}

#[test]
fn test_cue_navigation_wraps_around() {
    let mut html = String::from("<p>");
    for i in 0..100 {
        if [10, 50, 90].contains(&i) {
            html.push_str(&format!(r#"<a name="cue{i}">x</a>"#));
        } else {
            html.push('x');
        }
    }
    html.push_str("</p>");

    let mut handler = DocumentHandler::new(RichTextDocument::from_html(&html));
    assert_eq!(handler.next_marker(50), 90);
    assert_eq!(handler.next_marker(90), 10);
    assert_eq!(handler.previous_marker(10), 90);
    assert_eq!(handler.previous_marker(50), 10);
}

#[test]
fn test_missing_converter_message_names_program() {
    let converters = ConverterSet {
        pdf: ConverterCommand::new("prompter-integration-missing-converter"),
        ..ConverterSet::default()
    };
    let out = import_external(
        std::path::Path::new("script.pdf"),
        ImportFormat::Pdf,
        &converters,
    );
    assert_eq!(
        out,
        "An error occurred while loading converter. Make sure \
         prompter-integration-missing-converter is installed on your system."
    );
}

#[test]
fn test_pasted_cue_becomes_navigable() {
    let mut handler = DocumentHandler::new(RichTextDocument::from_plain_text("Intro. "));
    handler.set_caret(7);
    assert_eq!(handler.next_marker(0), 0);

    handler.paste(
        &ClipboardContent::from_html(
            r#"<p style="font-size:14pt"><a name="act2">Act two</a></p>"#,
            "Act two",
        ),
        false,
    );
    assert_eq!(handler.document().plain_text(), "Intro. Act two");
    assert_eq!(handler.next_marker(0), 7);
    assert_eq!(handler.markers()[0].names, vec!["act2"]);
}

#[test]
fn test_formatting_round_trips_through_html_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.html");

    let mut handler = DocumentHandler::new(RichTextDocument::from_plain_text("Hello cue world"));
    handler.select(0..5);
    handler.set_bold(true);
    handler.select(6..9);
    handler.set_marker(true);
    handler.save_as(&path).unwrap();

    let mut reloaded = DocumentHandler::default();
    reloaded.load(&path).unwrap();
    assert_eq!(reloaded.document().plain_text(), "Hello cue world");
    assert!(reloaded.document().char_format_at(3).is_bold());
    let markers = reloaded.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].position, 6);
    assert_eq!(markers[0].text, "cue");
}
