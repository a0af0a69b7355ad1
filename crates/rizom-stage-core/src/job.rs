//! Job directories on disk

use crate::tool::{FileWriter, IdGenerator, PathResolver};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A job's working directory
///
/// Relative file references resolve inside the directory, absolute ones are
/// used as-is and empty references do not resolve. Generated files are
/// written into the directory and named with UUID v4 ids.
#[derive(Debug, Clone)]
pub struct JobDirectory {
    root: PathBuf,
}

impl JobDirectory {
    /// Use `root` as the job's working directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The working directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the working directory if it does not exist yet
    pub async fn create(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }
}

impl PathResolver for JobDirectory {
    fn resolve_path(&self, file: &str) -> Option<PathBuf> {
        if file.trim().is_empty() {
            return None;
        }
        // Joining an absolute path replaces the root
        Some(self.root.join(file))
    }
}

impl IdGenerator for JobDirectory {
    fn unique_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl FileWriter for JobDirectory {
    async fn write_file(&self, name: &str, content: &str) -> std::io::Result<()> {
        tokio::fs::write(self.root.join(name), content).await
    }
}
