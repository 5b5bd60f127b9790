//! On-disk permission registry for platforms without an OS camera prompt.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PermissionError;

/// Registry file name inside the app data directory.
pub const PERMISSION_FILE: &str = "permissions.json";

/// Persisted answer history for the camera permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRecord {
    pub granted: bool,
    pub denials: u32,
    pub never_ask_again: bool,
}

/// JSON-backed camera permission registry.
pub struct PermissionStore {
    path: PathBuf,
    record: PermissionRecord,
}

impl PermissionStore {
    /// Open the registry in `dir`, starting empty if no file exists yet.
    pub fn open(dir: &Path) -> Result<Self, PermissionError> {
        let path = dir.join(PERMISSION_FILE);
        let record = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| store_err(&path, e))?;
            serde_json::from_str(&content).map_err(|e| store_err(&path, e))?
        } else {
            PermissionRecord::default()
        };
        Ok(Self { path, record })
    }

    pub fn record(&self) -> &PermissionRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_granted(&self) -> bool {
        self.record.granted
    }

    /// Denied at least once, but not with "never ask again".
    pub fn should_show_rationale(&self) -> bool {
        !self.record.granted && self.record.denials > 0 && !self.record.never_ask_again
    }

    /// Persist the user's answer to a prompt.
    pub fn record_response(
        &mut self,
        granted: bool,
        never_ask_again: bool,
    ) -> Result<(), PermissionError> {
        if granted {
            self.record.granted = true;
            self.record.never_ask_again = false;
        } else {
            self.record.granted = false;
            self.record.denials = self.record.denials.saturating_add(1);
            self.record.never_ask_again = never_ask_again;
        }
        self.save()
    }

    /// Forget all answers (the settings surface).
    pub fn reset(&mut self) -> Result<(), PermissionError> {
        self.record = PermissionRecord::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| store_err(&self.path, e))?;
        }
        Ok(())
    }

    fn save(&self) -> Result<(), PermissionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| store_err(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.record).map_err(|e| store_err(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| store_err(&self.path, e))
    }
}

fn store_err(path: &Path, e: impl std::fmt::Display) -> PermissionError {
    PermissionError::Store {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = PermissionStore::open(dir.path()).unwrap();
        assert_eq!(store.record(), &PermissionRecord::default());
        assert!(!store.is_granted());
        assert!(!store.should_show_rationale());
    }

    #[test]
    fn test_denial_then_rationale_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PermissionStore::open(dir.path()).unwrap();
        store.record_response(false, false).unwrap();
        assert!(store.should_show_rationale());

        let reopened = PermissionStore::open(dir.path()).unwrap();
        assert_eq!(reopened.record().denials, 1);
        assert!(reopened.should_show_rationale());
    }

    #[test]
    fn test_never_ask_again_hides_rationale() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PermissionStore::open(dir.path()).unwrap();
        store.record_response(false, true).unwrap();
        assert!(!store.should_show_rationale());
        assert!(store.record().never_ask_again);
    }

    #[test]
    fn test_reset_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PermissionStore::open(dir.path()).unwrap();
        store.record_response(true, false).unwrap();
        assert!(store.path().exists());

        store.reset().unwrap();
        assert!(!store.path().exists());
        assert!(!store.is_granted());
    }

    #[test]
    fn test_corrupt_file_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PERMISSION_FILE), "{not json").unwrap();
        let err = PermissionStore::open(dir.path()).err().unwrap();
        assert!(matches!(err, PermissionError::Store { .. }));
    }
}
