use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::import::{ConverterCommand, ConverterSet};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub pdf_converter: Option<String>,
    pub docx_converter: Option<String>,
    pub converter_timeout_secs: Option<u64>,
    pub keep_black_text: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            pdf_converter: other
                .pdf_converter
                .clone()
                .or_else(|| self.pdf_converter.clone()),
            docx_converter: other
                .docx_converter
                .clone()
                .or_else(|| self.docx_converter.clone()),
            converter_timeout_secs: other.converter_timeout_secs.or(self.converter_timeout_secs),
            keep_black_text: self.keep_black_text || other.keep_black_text,
        }
    }

    /// Converters with configured overrides applied to the defaults.
    ///
    /// An overridden program keeps the default trailing arguments of its slot.
    pub fn converter_set(&self) -> ConverterSet {
        let mut set = ConverterSet::default();
        if let Some(program) = &self.pdf_converter {
            set.pdf = ConverterCommand {
                program: program.clone(),
                ..set.pdf
            };
        }
        if let Some(program) = &self.docx_converter {
            set.docx = ConverterCommand {
                program: program.clone(),
                ..set.docx
            };
        }
        if let Some(secs) = self.converter_timeout_secs {
            set.timeout = Duration::from_secs(secs);
        }
        set
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("prompter").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("prompter")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("prompter").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("prompter")
                .join("config");
        }
    }

    PathBuf::from(".prompterrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".prompterrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# prompter defaults (saved with --save)".to_string());
    if let Some(program) = &flags.pdf_converter {
        lines.push(format!("--pdf-converter {program}"));
    }
    if let Some(program) = &flags.docx_converter {
        lines.push(format!("--docx-converter {program}"));
    }
    if let Some(secs) = flags.converter_timeout_secs {
        lines.push(format!("--timeout {secs}"));
    }
    if flags.keep_black_text {
        lines.push("--keep-black-text".to_string());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--keep-black-text" {
            flags.keep_black_text = true;
        } else if token == "--pdf-converter" {
            if let Some(next) = tokens.get(i + 1) {
                flags.pdf_converter = Some(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--pdf-converter=") {
            flags.pdf_converter = Some(value.to_string());
        } else if token == "--docx-converter" {
            if let Some(next) = tokens.get(i + 1) {
                flags.docx_converter = Some(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--docx-converter=") {
            flags.docx_converter = Some(value.to_string());
        } else if token == "--timeout" {
            if let Some(next) = tokens.get(i + 1) {
                flags.converter_timeout_secs = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--timeout=") {
            flags.converter_timeout_secs = value.parse().ok();
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "prompter".to_string(),
            "import".to_string(),
            "--pdf-converter".to_string(),
            "pdftotext".to_string(),
            "--docx-converter=pandoc".to_string(),
            "--timeout".to_string(),
            "12".to_string(),
            "--keep-black-text".to_string(),
            "script.pdf".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.pdf_converter.as_deref(), Some("pdftotext"));
        assert_eq!(flags.docx_converter.as_deref(), Some("pandoc"));
        assert_eq!(flags.converter_timeout_secs, Some(12));
        assert!(flags.keep_black_text);
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let flags = parse_flag_tokens(&["--timeout=soon".to_string()]);
        assert_eq!(flags.converter_timeout_secs, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            keep_black_text: true,
            pdf_converter: Some("pdftotext".to_string()),
            converter_timeout_secs: Some(60),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            pdf_converter: Some("mutool".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.keep_black_text);
        assert_eq!(merged.pdf_converter.as_deref(), Some("mutool"));
        assert_eq!(merged.converter_timeout_secs, Some(60));
        assert_eq!(merged.docx_converter, None);
    }

    #[test]
    fn test_converter_set_applies_overrides() {
        let flags = ConfigFlags {
            docx_converter: Some("my-docx2txt".to_string()),
            converter_timeout_secs: Some(3),
            ..ConfigFlags::default()
        };
        let set = flags.converter_set();
        assert_eq!(set.pdf.program, "TextExtraction");
        assert_eq!(set.docx.program, "my-docx2txt");
        assert_eq!(set.docx.trailing_args, vec!["-"]);
        assert_eq!(set.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".prompterrc");
        let flags = ConfigFlags {
            pdf_converter: Some("pdftotext".to_string()),
            docx_converter: Some("docx2txt.pl".to_string()),
            converter_timeout_secs: Some(45),
            keep_black_text: true,
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_loads_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
