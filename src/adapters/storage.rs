use crate::domain::ports::Storage;
use crate::utils::error::Result;
use glob::{glob, Pattern};
use std::fs;
use std::path::Path;

/// Reads export files from a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    /// Returns paths relative to the base directory. `glob` yields them in
    /// alphabetical order, which is the load order.
    async fn list_files(&self, pattern: &str) -> Result<Vec<String>> {
        let base = Path::new(&self.base_path);
        let full_pattern = format!(
            "{}/{}",
            Pattern::escape(&self.base_path).trim_end_matches('/'),
            pattern
        );

        let mut files = Vec::new();
        for entry in glob(&full_pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path {}: {}", e.path().display(), e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(base).unwrap_or(&path);
            files.push(relative.to_string_lossy().into_owned());
        }

        tracing::debug!("Pattern {} matched {} files", full_pattern, files.len());
        Ok(files)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }
}
