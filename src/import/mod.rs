//! Document import through external converters.
//!
//! PDF and DOCX files are converted by external programs that print the
//! document text to stdout. The output is treated as HTML and sanitized like
//! office-suite content. Failures are reported as a displayable message, since
//! the caller shows it to the user as the document content.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::sanitize;

/// How long a converter may run before it is treated as unavailable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// File formats that can only be read through an external converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Pdf,
    Docx,
    Unsupported,
}

impl ImportFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            _ => Self::Unsupported,
        }
    }
}

/// A converter program and the arguments that follow the input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    pub program: String,
    pub trailing_args: Vec<String>,
}

impl ConverterCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            trailing_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trailing_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// The converter registered for each supported format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSet {
    pub pdf: ConverterCommand,
    pub docx: ConverterCommand,
    pub timeout: Duration,
}

impl Default for ConverterSet {
    fn default() -> Self {
        Self {
            pdf: ConverterCommand::new("TextExtraction"),
            docx: ConverterCommand::new("docx2txt").with_args(["-"]),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConverterSet {
    pub const fn command_for(&self, format: ImportFormat) -> Option<&ConverterCommand> {
        match format {
            ImportFormat::Pdf => Some(&self.pdf),
            ImportFormat::Docx => Some(&self.docx),
            ImportFormat::Unsupported => None,
        }
    }
}

/// Why a converter produced no output.
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("Unsupported file format")]
    Unsupported,

    #[error(
        "An error occurred while loading converter. Make sure {program} is installed on your system."
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "An error occurred while loading converter. Make sure {program} is installed on your system."
    )]
    TimedOut { program: String, timeout: Duration },

    #[error(
        "An error occurred while loading converter. Make sure {program} is installed on your system."
    )]
    Failed { program: String, status: ExitStatus },
}

/// Convert `path` and return sanitized markup, or a message describing why
/// the converter could not be used.
pub fn import_external(path: &Path, format: ImportFormat, converters: &ConverterSet) -> String {
    match run_converter(path, format, converters) {
        Ok(output) => sanitize::sanitize(&output, false),
        Err(err) => {
            warn!(path = %path.display(), error = ?err, "import failed");
            err.to_string()
        }
    }
}

/// Run the converter for `format` on `path` and return its raw stdout.
///
/// # Errors
/// Returns an error if no converter is registered for `format`, the program
/// cannot be started, it exits unsuccessfully, or it does not finish within
/// the configured timeout (the process is killed in that case).
pub fn run_converter(
    path: &Path,
    format: ImportFormat,
    converters: &ConverterSet,
) -> Result<String, ConverterError> {
    let command = converters
        .command_for(format)
        .ok_or(ConverterError::Unsupported)?;
    let program = command.program.clone();
    debug!(%program, path = %path.display(), "starting converter");

    let spawn_error = |source| ConverterError::Spawn {
        program: program.clone(),
        source,
    };
    let mut child = Command::new(&command.program)
        .arg(path)
        .args(&command.trailing_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(spawn_error)?;

    let Some(mut stdout) = child.stdout.take() else {
        stop(&mut child);
        return Err(spawn_error(std::io::Error::other("converter stdout unavailable")));
    };

    // Drain stdout on a helper thread so a chatty converter cannot block on a
    // full pipe while we wait with a deadline.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = stdout.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });

    let deadline = Instant::now() + converters.timeout;
    let timed_out = || ConverterError::TimedOut {
        program: program.clone(),
        timeout: converters.timeout,
    };

    let output = match rx.recv_timeout(converters.timeout) {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(source)) => {
            stop(&mut child);
            return Err(spawn_error(source));
        }
        Err(_) => {
            stop(&mut child);
            return Err(timed_out());
        }
    };

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                stop(&mut child);
                return Err(timed_out());
            }
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(source) => {
                stop(&mut child);
                return Err(spawn_error(source));
            }
        }
    };
    if !status.success() {
        return Err(ConverterError::Failed {
            program: program.clone(),
            status,
        });
    }

    debug!(%program, bytes = output.len(), "converter finished");
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
