//! Local daemon configuration writer
//!
//! Serializes the declared `local_config` mapping to the daemon's
//! `local.conf`. The write is a full overwrite of the file (no merge with
//! existing content), and only happens when the rendered document differs
//! from what is on disk, so the caller knows whether a daemon restart is
//! needed.
//!
//! The rendered form is canonical: pretty-printed JSON with sorted keys and
//! a trailing newline. Serializing, reading back, and re-serializing yields
//! byte-identical output.

use crate::error::{Result, ZtAgentError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writer for the daemon's `local.conf`
pub struct LocalConfigWriter {
    path: PathBuf,
}

impl LocalConfigWriter {
    /// Create a writer for `local.conf` under the given daemon home
    /// directory
    pub fn new(home: &Path) -> Self {
        Self {
            path: home.join("local.conf"),
        }
    }

    /// Create a writer targeting an explicit path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render a declared mapping to its canonical on-disk form
    pub fn render(declared: &Value) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(declared).map_err(|e| {
            ZtAgentError::Serialization(format!("Failed to serialize local config: {}", e))
        })?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Check whether the file already matches the declared mapping.
    ///
    /// The comparison is on parsed values, so whitespace-only differences in
    /// a hand-edited file still count as current; the canonical form is only
    /// imposed when a write happens anyway.
    pub fn is_current(&self, declared: &Value) -> Result<bool> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&existing) {
            Ok(value) => Ok(&value == declared),
            // Unparseable content is never current
            Err(_) => Ok(false),
        }
    }

    /// Write the declared mapping if it differs from the file on disk.
    ///
    /// Returns `true` if the file was (re)written, meaning the daemon needs
    /// a restart to pick it up.
    pub fn write(&self, declared: &Value) -> Result<bool> {
        if self.is_current(declared)? {
            debug!("{:?} already matches the declaration", self.path);
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ZtAgentError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to create {:?}: {}", parent, e),
                ))
            })?;
        }

        let rendered = Self::render(declared)?;
        std::fs::write(&self.path, rendered)?;
        info!("Wrote {:?}", self.path);

        Ok(true)
    }
}

/// Apply an optional local-config declaration to the daemon home.
///
/// Absent declaration means the file is left completely untouched (not even
/// created). Returns whether the file changed.
pub fn sync(home: &Path, declared: Option<&Value>) -> Result<bool> {
    match declared {
        None => Ok(false),
        Some(value) => LocalConfigWriter::new(home).write(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "settings": {
                "allowTcpFallbackRelay": false,
                "primaryPort": 9993
            }
        })
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        assert!(writer.write(&sample()).unwrap());
        assert!(writer.path().exists());
    }

    #[test]
    fn test_second_write_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        assert!(writer.write(&sample()).unwrap());
        assert!(!writer.write(&sample()).unwrap());
    }

    #[test]
    fn test_changed_declaration_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        writer.write(&sample()).unwrap();
        let changed = writer
            .write(&json!({ "settings": { "primaryPort": 9994 } }))
            .unwrap();
        assert!(changed);
    }

    #[test]
    fn test_hand_edited_whitespace_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        // Same value, different formatting
        std::fs::write(
            writer.path(),
            r#"{"settings":{"allowTcpFallbackRelay":false,"primaryPort":9993}}"#,
        )
        .unwrap();

        assert!(writer.is_current(&sample()).unwrap());
        assert!(!writer.write(&sample()).unwrap());
    }

    #[test]
    fn test_corrupt_file_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        std::fs::write(writer.path(), "not json {").unwrap();
        assert!(writer.write(&sample()).unwrap());

        let contents = std::fs::read_to_string(writer.path()).unwrap();
        let parsed: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_sync_without_declaration_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.conf");
        std::fs::write(&path, "{\"pre\": true}").unwrap();

        assert!(!sync(dir.path(), None).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"pre\": true}"
        );

        // And no file appears when none existed
        let empty = tempfile::tempdir().unwrap();
        assert!(!sync(empty.path(), None).unwrap());
        assert!(!empty.path().join("local.conf").exists());
    }

    #[test]
    fn test_sync_with_declaration_writes() {
        let dir = tempfile::tempdir().unwrap();
        let value = sample();
        assert!(sync(dir.path(), Some(&value)).unwrap());
        assert!(dir.path().join("local.conf").exists());
    }

    #[test]
    fn test_render_round_trip_is_byte_identical() {
        let rendered = LocalConfigWriter::render(&sample()).unwrap();
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        let rerendered = LocalConfigWriter::render(&reparsed).unwrap();
        assert_eq!(rendered, rerendered);
    }
}
