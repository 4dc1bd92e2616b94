use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::{HeaderMap, StatusCode, header};
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::sanitize::sanitize_filename;
use super::scope::{UploadScope, UploadedFile};
use crate::config::UploadConfig;
use crate::humanize::ByteSize;
use crate::tools::ToolDescriptor;

/// Multipart field carrying the uploaded file(s).
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFiles,
    #[error("upload exceeds the {limit} limit")]
    TooLarge { limit: ByteSize },
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Reject a request whose declared `Content-Length` is already over the limit.
pub fn check_content_length(headers: &HeaderMap, limit: ByteSize) -> Result<(), UploadError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > limit.as_u64() => Err(UploadError::TooLarge { limit }),
        _ => Ok(()),
    }
}

struct BufferedPart {
    file_name: String,
    data: Bytes,
}

/// Read every `file` part of the request and persist it under the upload dir.
///
/// The whole body is buffered before anything touches the disk, so a request
/// rejected for size or framing leaves no files behind. Single-file tools keep
/// only the first part.
pub async fn receive_files(
    mut multipart: Multipart,
    tool: &ToolDescriptor,
    uploads: &UploadConfig,
) -> Result<UploadScope, UploadError> {
    let limit = uploads.max_upload_size;
    let mut parts = Vec::new();
    let mut total = 0u64;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| map_multipart_error(err, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Ignoring non-file form field");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| map_multipart_error(err, limit))?;

        total += data.len() as u64;
        if total > limit.as_u64() {
            return Err(UploadError::TooLarge { limit });
        }

        parts.push(BufferedPart { file_name, data });
    }

    match parts.first() {
        None => return Err(UploadError::NoFiles),
        Some(first) if first.file_name.is_empty() => return Err(UploadError::NoFiles),
        Some(_) => {}
    }

    if !tool.allows_multiple_files && parts.len() > 1 {
        debug!(tool = tool.id, dropped = parts.len() - 1, "Single-file tool, ignoring extra parts");
        parts.truncate(1);
    }

    let scope = persist(parts, &uploads.upload_dir).await?;
    info!(tool = tool.id, files = scope.len(), bytes = total, "Upload accepted");
    Ok(scope)
}

async fn persist(parts: Vec<BufferedPart>, upload_dir: &Path) -> Result<UploadScope, UploadError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let request_id = Uuid::new_v4().simple().to_string();
    let mut scope = UploadScope::new();

    for (index, part) in parts.into_iter().enumerate() {
        let stored_name = format!(
            "{request_id}-{index}-{}",
            sanitize_filename(&part.file_name)
        );
        let tracked = scope.track(UploadedFile {
            original_name: part.file_name,
            stored_path: upload_dir.join(stored_name),
        });
        // On failure the scope drops and removes whatever was written.
        tokio::fs::write(&tracked.stored_path, &part.data).await?;
    }

    Ok(scope)
}

fn map_multipart_error(err: MultipartError, limit: ByteSize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit }
    } else {
        UploadError::Malformed(err.body_text())
    }
}
