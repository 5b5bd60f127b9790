//! Gallery listing backing the external image picker.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::GalleryConfig;

use super::ContentHandle;

/// Lists pickable images under a gallery directory.
pub struct Gallery {
    config: GalleryConfig,
}

/// A pickable image.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl GalleryEntry {
    /// Handle handed back to the router when this entry is picked.
    pub fn handle(&self) -> ContentHandle {
        ContentHandle::from(self.path.as_path())
    }
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self { config }
    }

    /// List all supported images at `dir`, sorted by path.
    ///
    /// A single supported file is returned as-is; unreadable entries are
    /// skipped.
    pub fn list(&self, dir: &Path) -> Vec<GalleryEntry> {
        if dir.is_file() {
            return match std::fs::metadata(dir) {
                Ok(meta) if self.is_supported(dir) => vec![GalleryEntry {
                    path: dir.to_path_buf(),
                    size: meta.len(),
                }],
                _ => vec![],
            };
        }

        let mut entries: Vec<GalleryEntry> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .filter_map(|e| {
                let size = e.metadata().ok()?.len();
                Some(GalleryEntry {
                    path: e.into_path(),
                    size,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Gallery {:?}: {} images", dir, entries.len());
        entries
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let gallery = Gallery::new(GalleryConfig::default());

        assert!(gallery.is_supported(Path::new("robin.jpg")));
        assert!(gallery.is_supported(Path::new("robin.JPG")));
        assert!(gallery.is_supported(Path::new("robin.png")));
        assert!(!gallery.is_supported(Path::new("notes.txt")));
        assert!(!gallery.is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("2024")).unwrap();
        std::fs::write(dir.path().join("wren.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("2024/heron.png"), b"xy").unwrap();
        std::fs::write(dir.path().join("list.txt"), b"xyz").unwrap();

        let gallery = Gallery::new(GalleryConfig::default());
        let entries = gallery.list(dir.path());

        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("2024/heron.png"), PathBuf::from("wren.jpg")]
        );
        assert_eq!(entries[0].size, 2);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let gallery = Gallery::new(GalleryConfig::default());
        assert!(gallery.list(Path::new("/nonexistent/gallery")).is_empty());
    }

    #[test]
    fn test_entry_handle_round_trips_path() {
        let entry = GalleryEntry {
            path: PathBuf::from("/photos/kite.jpg"),
            size: 1,
        };
        assert_eq!(entry.handle().resolve(), PathBuf::from("/photos/kite.jpg"));
    }
}
