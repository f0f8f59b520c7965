use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::import::{self, ImportFormat};

use super::DocumentHandler;

const UNTITLED: &str = "untitled.txt";

/// File errors raised by [`DocumentHandler`].
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot open {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot save: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot save: the document has no file name")]
    Untitled,
}

/// How a file is read into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Html,
    Markdown,
    Converted(ImportFormat),
    PlainText,
}

impl LoadKind {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("html" | "htm" | "xhtml") => Self::Html,
            Some("md" | "markdown") => Self::Markdown,
            _ => match ImportFormat::from_path(path) {
                ImportFormat::Unsupported => Self::PlainText,
                format => Self::Converted(format),
            },
        }
    }
}

impl DocumentHandler {
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// File name of the current path, `untitled.txt` when there is none.
    pub fn file_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| UNTITLED.to_string(), |name| name.to_string_lossy().into_owned())
    }

    /// Extension of [`Self::file_name`], empty when it has none.
    pub fn file_type(&self) -> String {
        Path::new(&self.file_name())
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_modified(&self) -> bool {
        self.document.is_modified()
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.document.set_modified(modified);
    }

    /// Replace the document with the contents of `path`.
    ///
    /// HTML is read directly and Markdown is rendered to HTML first. PDF and
    /// DOCX go through the external converters; a converter failure becomes
    /// the document text. Anything else is read as UTF-8 text. Loading the
    /// current path again does nothing.
    ///
    /// # Errors
    /// Returns [`DocumentError::Read`] if the file cannot be read.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        if self.file_path.as_deref() == Some(path) {
            return Ok(());
        }
        let kind = LoadKind::from_path(path);
        debug!(path = %path.display(), ?kind, "loading document");

        match kind {
            LoadKind::Converted(format) => {
                if !path.exists() {
                    return Err(read_error(path, io::ErrorKind::NotFound.into()));
                }
                let html = import::import_external(path, format, &self.converters);
                self.document.set_html(&html);
            }
            LoadKind::Html => {
                let data = fs::read(path).map_err(|source| read_error(path, source))?;
                self.document.set_html(&String::from_utf8_lossy(&data));
            }
            LoadKind::Markdown => {
                let data = fs::read(path).map_err(|source| read_error(path, source))?;
                let markdown = String::from_utf8_lossy(&data);
                let mut options = comrak::Options::default();
                options.extension.strikethrough = true;
                options.extension.table = true;
                options.extension.autolink = true;
                let html = comrak::markdown_to_html(&markdown, &options);
                self.document.set_html(&html);
            }
            LoadKind::PlainText => {
                let data = fs::read(path).map_err(|source| read_error(path, source))?;
                self.document.set_plain_text(&String::from_utf8_lossy(&data));
            }
        }

        self.document.set_modified(false);
        self.set_caret(0);
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the document back to its current path.
    ///
    /// # Errors
    /// Returns [`DocumentError::Untitled`] if no path is set, otherwise as
    /// [`Self::save_as`].
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.file_path.clone().ok_or(DocumentError::Untitled)?;
        self.save_as(path)
    }

    /// Write the document to `path` and make it the current path.
    ///
    /// The document is written as HTML when the extension contains `htm`,
    /// as plain text otherwise.
    ///
    /// # Errors
    /// Returns [`DocumentError::Write`] if the file cannot be written.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let is_html = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().contains("htm"));
        let contents = if is_html {
            self.document.to_html()
        } else {
            self.document.plain_text()
        };
        fs::write(path, contents).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), is_html, "saved document");

        self.document.set_modified(false);
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }
}

fn read_error(path: &Path, source: io::Error) -> DocumentError {
    DocumentError::Read {
        path: path.to_path_buf(),
        source,
    }
}
