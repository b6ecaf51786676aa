//! Relative path normalization.
//!
//! Paths handed to a backend are relative to a storage root. They are
//! normalized into a list of plain segments before any lookup so that
//! `a//b/./c`, `/a/b/c/` and `a/b/c` all address the same entry, and so
//! that `..` can never climb above the root.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Normalize a root-relative path.
///
/// Returns an empty `PathBuf` for the root itself.
pub fn normalize(path: &str) -> Result<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::InvalidPath(format!("{path}: escapes storage root")));
                }
            }
            name => {
                if let Some(bad) = find_unsafe_path_char(name) {
                    return Err(Error::InvalidPath(format!(
                        "{}: unsafe character {bad}",
                        path.escape_debug()
                    )));
                }
                segments.push(name);
            }
        }
    }

    Ok(segments.iter().collect())
}

/// Render a normalized path with `/` separators, as used in uris.
pub fn to_slash(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// Control chars and bidi overrides make log lines and uris ambiguous.
fn find_unsafe_path_char(name: &str) -> Option<String> {
    for ch in name.chars() {
        if ch.is_ascii_control() || ('\u{0080}'..='\u{009F}').contains(&ch) {
            return Some(format!("U+{:04X}", ch as u32));
        }
        if ('\u{202A}'..='\u{202E}').contains(&ch) || ('\u{2066}'..='\u{2069}').contains(&ch) {
            return Some(format!("U+{:04X} (bidi override)", ch as u32));
        }
    }
    None
}
