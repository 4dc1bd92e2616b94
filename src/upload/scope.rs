use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// One uploaded file persisted for the lifetime of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub stored_path: PathBuf,
}

/// Owns every file written for one request and removes them when dropped.
///
/// Files are recorded before they are written, so a write that fails midway
/// is still cleaned up. Removal is best-effort: failures are logged and never
/// propagate.
#[derive(Debug, Default)]
pub struct UploadScope {
    files: Vec<UploadedFile>,
}

impl UploadScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn track(&mut self, file: UploadedFile) -> &UploadedFile {
        self.files.push(file);
        &self.files[self.files.len() - 1]
    }

    /// Files in upload order.
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Stored paths in upload order, detached from the scope's lifetime.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.stored_path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Remove every tracked file now instead of waiting for drop.
    pub async fn release(mut self) {
        for file in std::mem::take(&mut self.files) {
            let path = file.stored_path;
            log_removal(&path, tokio::fs::remove_file(&path).await);
        }
    }
}

impl Drop for UploadScope {
    // Reached when `release` was skipped (early return, cancelled task).
    fn drop(&mut self) {
        for file in self.files.drain(..) {
            let path = file.stored_path;
            log_removal(&path, std::fs::remove_file(&path));
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "Removed upload"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "Failed to remove upload"),
    }
}
