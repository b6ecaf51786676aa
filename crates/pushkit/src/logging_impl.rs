//! Logging helpers for Pushkit
//!
//! Pushkit emits `tracing` events and never installs a subscriber; the host
//! application decides where they go.
//!
//! # Log Levels
//!
//! - **WARN**: swallowed failures (batch deletes), failed writes
//! - **DEBUG**: directory cleaning, unimplemented copy requests
//! - **TRACE**: individual writes
//!
//! File contents are not logged by default. Package metadata files can
//! carry deployment keys, so only a size summary is emitted unless
//! [`LogConfig::unsafe_log_file_contents`] is set.

use std::borrow::Cow;

/// Configuration for logging behavior
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether to include file contents in logs (default: false)
    pub log_file_contents: bool,

    /// Maximum length of logged values before truncation (default: 200)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file_contents: false,
            max_value_length: 200,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable logging of file contents (UNSAFE)
    ///
    /// # Warning
    ///
    /// Written files may contain deployment keys or other secrets.
    pub fn unsafe_log_file_contents(mut self) -> Self {
        self.log_file_contents = true;
        self
    }

    /// Set maximum length for logged values
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Truncate value if it exceeds max length
    ///
    /// Handles UTF-8 char boundaries properly to avoid panics on multi-byte chars.
    pub fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            Cow::Borrowed(value)
        } else {
            let mut end = self.max_value_length;
            while end > 0 && !value.is_char_boundary(end) {
                end -= 1;
            }
            Cow::Owned(format!(
                "{}...[truncated {} bytes]",
                &value[..end],
                value.len() - end
            ))
        }
    }

    /// Sanitize and truncate a path for logging.
    pub fn path<'a>(&self, path: &'a str) -> Cow<'a, str> {
        if path.chars().any(|c| c.is_control()) {
            Cow::Owned(self.truncate(&sanitize_for_log(path)).into_owned())
        } else {
            self.truncate(path)
        }
    }
}

/// Escape characters that could forge extra log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}

/// Format file content for logging, summarized unless contents are enabled.
pub fn format_content_for_log(content: &str, config: &LogConfig) -> String {
    if !config.log_file_contents {
        let lines = content.lines().count();
        let bytes = content.len();
        return format!("[content: {} lines, {} bytes]", lines, bytes);
    }

    let sanitized = sanitize_for_log(content);
    config.truncate(&sanitized).into_owned()
}
