use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use thiserror::Error;

/// Output of a conversion, held entirely in memory.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub bytes: Bytes,
    pub mime_type: Mime,
    pub download_name: String,
}

impl ConversionResult {
    pub fn new(bytes: impl Into<Bytes>, mime_type: Mime, download_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
            download_name: download_name.into(),
        }
    }
}

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("unsupported tool: {0}")]
    UnsupportedTool(String),
    #[error("no input file supplied")]
    MissingInput,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("document error: {0}")]
    Document(String),
    #[error("{program} failed: {detail}")]
    ExternalTool { program: String, detail: String },
    #[error("conversion task failed: {0}")]
    Task(String),
}

/// One tool's conversion routine.
///
/// Receives the uploaded files in upload order. Implementations must not keep
/// any file they create past the end of `convert`.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError>;
}

/// First input, for single-file converters.
pub(crate) fn single_input(inputs: &[PathBuf]) -> Result<PathBuf, ConversionError> {
    inputs.first().cloned().ok_or(ConversionError::MissingInput)
}

/// Run CPU-bound work off the async executor.
pub(crate) async fn run_blocking<F>(work: F) -> Result<ConversionResult, ConversionError>
where
    F: FnOnce() -> Result<ConversionResult, ConversionError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ConversionError::Task(format!("task join error: {e}")))?
}

/// Parse a static media type, falling back to `application/octet-stream`.
pub(crate) fn media_type(essence: &'static str) -> Mime {
    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
