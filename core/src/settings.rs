//! Application settings: a JSON document with dotted-path access.
//!
//! `set` persists immediately (atomic write); `get` walks the in-memory
//! tree. A missing or corrupt file falls back to defaults with a warning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use thiserror::Error;

use crate::atomic_write::atomic_write;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    root: Value,
}

impl SettingsStore {
    /// The default settings tree.
    #[must_use]
    pub fn defaults() -> Value {
        json!({
            "ui": {
                "ascii_only": false,
                "high_contrast": false,
                "reduced_motion": false,
            },
            "prompt": {
                "default_mode": "SFW",
                "separator": ", ",
                "max_prompt_length": 1000,
            },
            "templates": {
                "max_recent": 10,
            },
        })
    }

    /// Open the store at `path`, loading the file if it exists.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "Settings file is not valid JSON, using defaults: {e}"
                    );
                    Self::defaults()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::defaults(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Failed to read settings, using defaults: {e}"
                );
                Self::defaults()
            }
        };
        Self { path, root }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value by dotted path, e.g. `"ui.high_contrast"`.
    #[must_use]
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in dotted.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    #[must_use]
    pub fn get_bool(&self, dotted: &str, default: bool) -> bool {
        self.get(dotted).and_then(Value::as_bool).unwrap_or(default)
    }

    #[must_use]
    pub fn get_str<'a>(&'a self, dotted: &str, default: &'a str) -> &'a str {
        self.get(dotted).and_then(Value::as_str).unwrap_or(default)
    }

    #[must_use]
    pub fn get_u64(&self, dotted: &str, default: u64) -> u64 {
        self.get(dotted).and_then(Value::as_u64).unwrap_or(default)
    }

    /// Set a value by dotted path, creating intermediate objects as needed,
    /// and persist the whole document. A non-object value in the middle of
    /// the path is replaced by an object (last write wins).
    pub fn set(&mut self, dotted: &str, value: Value) -> Result<(), SettingsError> {
        let mut segments = dotted.split('.').peekable();
        let mut current = &mut self.root;

        while let Some(segment) = segments.next() {
            if !current.is_object() {
                *current = json!({});
            }
            let map = current
                .as_object_mut()
                .expect("current was just coerced to an object");
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                break;
            }
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| json!({}));
        }

        self.save()
    }

    /// Restore defaults and persist them.
    pub fn reset(&mut self) -> Result<(), SettingsError> {
        self.root = Self::defaults();
        self.save()
    }

    fn save(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_vec_pretty(&self.root)?;
        atomic_write(&self.path, &json).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::SettingsStore;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::open(dir.path().join("settings.json"));

        assert_eq!(store.get_str("prompt.default_mode", ""), "SFW");
        assert!(!store.get_bool("ui.high_contrast", true));
        assert_eq!(store.get_u64("templates.max_recent", 0), 10);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "][").expect("write corrupt");

        let store = SettingsStore::open(&path);
        assert_eq!(store.get_str("prompt.separator", ""), ", ");
    }

    #[test]
    fn set_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::open(&path);
        store.set("ui.high_contrast", json!(true)).expect("set");
        store.set("prompt.default_mode", json!("NSFW")).expect("set");

        let reloaded = SettingsStore::open(&path);
        assert!(reloaded.get_bool("ui.high_contrast", false));
        assert_eq!(reloaded.get_str("prompt.default_mode", ""), "NSFW");
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SettingsStore::open(dir.path().join("settings.json"));

        store.set("export.last_dir", json!("/tmp")).expect("set");
        assert_eq!(
            store.get("export.last_dir").and_then(|v| v.as_str()),
            Some("/tmp")
        );
    }

    #[test]
    fn set_replaces_non_object_intermediate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SettingsStore::open(dir.path().join("settings.json"));

        store.set("a", json!(42)).expect("set scalar");
        store.set("a.b", json!("nested")).expect("set through scalar");
        assert_eq!(store.get("a.b").and_then(|v| v.as_str()), Some("nested"));
    }

    #[test]
    fn reset_restores_defaults_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::open(&path);
        store.set("prompt.separator", json!(" / ")).expect("set");
        store.reset().expect("reset");

        let reloaded = SettingsStore::open(&path);
        assert_eq!(reloaded.get_str("prompt.separator", ""), ", ");
    }

    #[test]
    fn get_missing_path_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert!(store.get("no.such.path").is_none());
        assert!(store.get("prompt.default_mode.deeper").is_none());
    }
}
