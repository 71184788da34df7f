use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Persisted string preferences (the `localStorage` of the runtime).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(values: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        let prefs = Self::new();
        prefs.values.borrow_mut().extend(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        prefs
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Preferences kept in a flat JSON object on disk; every write rewrites the
/// file.
pub struct FilePreferences {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| Error::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(Error::Io { path, source }),
        };
        log::debug!("preferences: loaded {} key(s) from {}", values.len(), path.display());
        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.values.borrow()).map_err(|source| {
            Error::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.values.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let prefs = MemoryPreferences::with([("theme", "light")]);
        assert_eq!(prefs.get("theme").as_deref(), Some("light"));
        prefs.set("theme", "dark").unwrap();
        assert_eq!(prefs.get("theme").as_deref(), Some("dark"));
        prefs.remove("theme").unwrap();
        assert!(prefs.get("theme").is_none());
    }

    #[test]
    fn file_preferences_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let prefs = FilePreferences::open(&path).unwrap();
            assert!(prefs.get("theme").is_none());
            prefs.set("theme", "light").unwrap();
            prefs.set("jobfinder_has_seen_tour", "true").unwrap();
        }
        let prefs = FilePreferences::open(&path).unwrap();
        assert_eq!(prefs.get("theme").as_deref(), Some("light"));
        assert_eq!(prefs.get("jobfinder_has_seen_tour").as_deref(), Some("true"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FilePreferences::open(&path),
            Err(Error::Json { .. })
        ));
    }
}
