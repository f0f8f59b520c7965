use std::time::Duration;

use prompter::config::{load_config_flags, parse_flag_tokens, ConfigFlags};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".prompterrc");
    let content = r#"
# comment
--keep-black-text

--pdf-converter pdftotext

--timeout=90
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.keep_black_text);
    assert_eq!(flags.pdf_converter.as_deref(), Some("pdftotext"));
    assert_eq!(flags.converter_timeout_secs, Some(90));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".prompterrc");
    let content = "--keep-black-text\n--pdf-converter pdftotext\n--timeout 20\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "prompter".to_string(),
        "--pdf-converter".to_string(),
        "mutool".to_string(),
        "--docx-converter=pandoc".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.keep_black_text, "file flags should remain enabled");
    assert_eq!(
        effective.pdf_converter.as_deref(),
        Some("mutool"),
        "cli should override converter"
    );
    assert_eq!(effective.docx_converter.as_deref(), Some("pandoc"));
    assert_eq!(
        effective.converter_timeout_secs,
        Some(20),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_effective_flags_build_converter_set() {
    let args = vec![
        "prompter".to_string(),
        "--pdf-converter=pdftotext".to_string(),
        "--timeout=2".to_string(),
    ];
    let set = parse_flag_tokens(&args).converter_set();
    assert_eq!(set.pdf.program, "pdftotext");
    assert_eq!(set.docx.program, "docx2txt");
    assert_eq!(set.timeout, Duration::from_secs(2));
}

#[test]
fn test_default_flags_use_builtin_converters() {
    let set = ConfigFlags::default().converter_set();
    assert_eq!(set.pdf.program, "TextExtraction");
    assert_eq!(set.timeout, Duration::from_secs(30));
}
