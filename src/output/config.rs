//! Export configuration types

use chrono::Utc;

/// Metadata and switches for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub progname: String,
    pub progver: String,
    /// Seconds since the epoch, captured once per run.
    pub timestamp: i64,
    /// Include `mtime` in file objects (ncdu's extended format).
    pub extended: bool,
}

impl ExportConfig {
    /// Create a config stamped with the current time.
    pub fn new(progname: impl Into<String>, progver: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
            progver: progver.into(),
            timestamp: Utc::now().timestamp(),
            extended: false,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}
