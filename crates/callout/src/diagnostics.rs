//! Captured diagnostic output.
//!
//! A callout has no console of its own. Lines written here are buffered and
//! published to the `info.stdout` / `info.stderr` flow variables, and every
//! line is also emitted as a tracing event.

use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    stdout: String,
    stderr: String,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an informational line.
    pub fn info(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        info!("{line}");
        self.stdout.push_str(line);
        self.stdout.push('\n');
    }

    /// Append an error line.
    pub fn error(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        warn!("{line}");
        self.stderr.push_str(line);
        self.stderr.push('\n');
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
