//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;

/// Where log output goes and how chatty it is.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Number of `-v` flags given on the command line.
    pub verbosity: u8,
    pub file: Option<PathBuf>,
    /// Suppress stderr output entirely, e.g. while the terminal UI owns the screen.
    pub quiet: bool,
}

impl LogOptions {
    pub fn level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(options: &LogOptions) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(options.level())
        .with_target(false);

    let installed = match (&options.file, options.quiet) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, true) => return Ok(()),
        (None, false) => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
