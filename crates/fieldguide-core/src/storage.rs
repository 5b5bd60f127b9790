//! Where captured photos are written.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{fallback_app_dir, Config};
use crate::error::CaptureError;

/// Resolves the capture output directory and file name.
///
/// Candidates are tried in order: the configured `capture.output_dir`, the
/// app media directory (`<data dir>/media`), then the general app directory.
/// The first one that can be created wins.
#[derive(Debug, Clone)]
pub struct CaptureStorage {
    dir: PathBuf,
    file_name: String,
    timestamped: bool,
}

impl CaptureStorage {
    pub fn from_config(config: &Config) -> Result<Self, CaptureError> {
        let mut candidates = Vec::new();
        if let Some(dir) = &config.capture.output_dir {
            candidates.push(PathBuf::from(
                shellexpand::tilde(&dir.to_string_lossy()).into_owned(),
            ));
        }
        candidates.push(Config::data_dir().join("media"));
        candidates.push(fallback_app_dir());

        let dir = Self::first_usable(&candidates)?;
        tracing::debug!("Capture output directory: {:?}", dir);
        Ok(Self {
            dir,
            file_name: config.capture.file_name.clone(),
            timestamped: config.capture.timestamped,
        })
    }

    /// Storage rooted at an explicit directory, using the fixed file name.
    pub fn in_dir(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            timestamped: false,
        }
    }

    pub fn timestamped(mut self, timestamped: bool) -> Self {
        self.timestamped = timestamped;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for the next capture.
    ///
    /// With a fixed name the previous photo is overwritten; only one capture
    /// is ever outstanding per session.
    pub fn next_destination(&self) -> PathBuf {
        if self.timestamped {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            self.dir.join(format!("capture-{}.jpg", millis))
        } else {
            self.dir.join(&self.file_name)
        }
    }

    fn first_usable(candidates: &[PathBuf]) -> Result<PathBuf, CaptureError> {
        let mut last_error = None;
        for dir in candidates {
            match std::fs::create_dir_all(dir) {
                Ok(()) => return Ok(dir.clone()),
                Err(e) => {
                    tracing::warn!("Cannot use {:?} for captures: {}", dir, e);
                    last_error = Some((dir.clone(), e));
                }
            }
        }
        let (path, e) = last_error.unwrap_or_else(|| {
            (
                PathBuf::new(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no output directory"),
            )
        });
        Err(CaptureError::Failed {
            path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.capture.output_dir = Some(tmp.path().join("shots"));

        let storage = CaptureStorage::from_config(&config).unwrap();
        assert_eq!(storage.dir(), tmp.path().join("shots"));
        assert!(storage.dir().is_dir());
        assert_eq!(storage.next_destination(), tmp.path().join("shots/buff.jpg"));
    }

    #[test]
    fn test_falls_back_when_dir_cannot_be_created() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let usable = tmp.path().join("fallback");

        let dir = CaptureStorage::first_usable(&[blocker.join("media"), usable.clone()]).unwrap();
        assert_eq!(dir, usable);
    }

    #[test]
    fn test_no_usable_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = CaptureStorage::first_usable(&[blocker.join("a")]).unwrap_err();
        assert!(matches!(err, CaptureError::Failed { .. }));
    }

    #[test]
    fn test_timestamped_names() {
        let storage = CaptureStorage::in_dir("/tmp/shots", "buff.jpg").timestamped(true);
        let name = storage.next_destination();
        let name = name.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("capture-"));
        assert!(name.ends_with(".jpg"));
    }
}
