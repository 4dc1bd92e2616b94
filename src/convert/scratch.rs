use std::path::Path;

use tempfile::TempPath;
use tracing::warn;

/// Reserve an empty, uniquely named output file for an external program.
///
/// The returned path deletes its file when dropped, so a failing conversion
/// cannot leak it.
pub(crate) async fn reserve(dir: &Path, suffix: &str) -> std::io::Result<TempPath> {
    let (dir, suffix) = (dir.to_path_buf(), suffix.to_string());
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&dir)?;
        let file = tempfile::Builder::new()
            .prefix("pdfvert-")
            .suffix(&suffix)
            .tempfile_in(&dir)?;
        Ok(file.into_temp_path())
    })
    .await
    .map_err(std::io::Error::other)?
}

/// Read a finished scratch output into memory and delete it.
pub(crate) async fn take(path: TempPath) -> std::io::Result<Vec<u8>> {
    let data = tokio::fs::read(&path).await?;
    let shown = path.display().to_string();
    let closed = tokio::task::spawn_blocking(move || path.close())
        .await
        .map_err(std::io::Error::other)?;
    if let Err(err) = closed {
        warn!(path = %shown, error = %err, "Failed to remove scratch file");
    }
    Ok(data)
}
