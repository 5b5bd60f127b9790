//! Model label vocabulary.

use std::path::Path;

use crate::error::InferenceError;

/// Class labels in canonical (file) order.
///
/// One label per line. Blank lines and `#` comments are skipped. Lines of the
/// form `<index>,<name>` (label map CSVs) keep only the name, and an
/// `id,name` header is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let content = std::fs::read_to_string(path).map_err(|e| InferenceError::ModelLoad {
            path: path.to_path_buf(),
            message: format!("Cannot read labels: {}", e),
        })?;
        Self::parse(&content).map_err(|message| InferenceError::ModelLoad {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let labels: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| !line.eq_ignore_ascii_case("id,name"))
            .map(|line| match line.split_once(',') {
                Some((index, name)) if index.trim().parse::<u32>().is_ok() => {
                    name.trim().to_string()
                }
                _ => line.to_string(),
            })
            .collect();

        if labels.is_empty() {
            return Err("Label file contains no labels".to_string());
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
