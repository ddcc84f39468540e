//! Preference storage.
//!
//! One small JSON document in the user data directory. Read once at startup,
//! written through on every change. Failures never reach the user: the
//! controller degrades to "preference not remembered".

use super::PreferenceStore;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

const PREFS_FILE: &str = "preferences.json";

pub struct FilePreferenceStore {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl FilePreferenceStore {
    pub fn new() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tablesum");
        Self::with_path(base_dir)
    }

    /// Storage rooted at a custom directory (useful for tests).
    pub fn with_path(base_dir: PathBuf) -> Self {
        let path = base_dir.join(PREFS_FILE);
        let document = Mutex::new(Self::read_document(&path));
        Self { path, document }
    }

    fn read_document(path: &Path) -> Map<String, Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read preferences");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %path.display(), "preferences file is not a JSON object, ignoring");
                Map::new()
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) {
        let result = self
            .path
            .parent()
            .map(std::fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|()| {
                let content = serde_json::to_string_pretty(&Value::Object(document.clone()))?;
                std::fs::write(&self.path, content)
            });

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "could not write preferences");
        }
    }
}

impl Default for FilePreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.document
            .lock()
            .ok()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut document) = self.document.lock() else {
            return;
        };
        document.insert(key.to_string(), Value::String(value.to_string()));
        self.write_document(&document);
    }
}
