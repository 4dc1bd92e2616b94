use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::convert::ConversionError;
use crate::humanize::ByteSize;
use crate::tools::NotFound;
use crate::upload::UploadError;

/// Message returned for any failed conversion. Details stay in the logs.
pub const CONVERSION_FAILED_MESSAGE: &str =
    "Conversion failed. Please check that the file is valid and try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("no file selected for {tool_id}")]
    NoFileSelected { tool_id: String },
    #[error("payload exceeds {limit}")]
    PayloadTooLarge { limit: ByteSize },
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("{tool} conversion failed: {source}")]
    Conversion {
        tool: String,
        #[source]
        source: ConversionError,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map an upload failure for `tool_id` onto its HTTP outcome.
    pub fn from_upload(tool_id: &str, err: UploadError) -> Self {
        match err {
            UploadError::NoFiles => ApiError::NoFileSelected {
                tool_id: tool_id.to_string(),
            },
            UploadError::TooLarge { limit } => ApiError::PayloadTooLarge { limit },
            UploadError::Malformed(detail) => ApiError::InvalidUpload(detail),
            UploadError::Io(err) => ApiError::Internal(format!("failed to store upload: {err}")),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownTool(_) => StatusCode::NOT_FOUND,
            ApiError::NoFileSelected { .. } => StatusCode::SEE_OTHER,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Conversion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownTool(_) => "UNKNOWN_TOOL",
            ApiError::NoFileSelected { .. } => "NO_FILE_SELECTED",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::InvalidUpload(_) => "INVALID_UPLOAD",
            ApiError::Conversion { .. } => "CONVERSION_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text shown to the user.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::UnknownTool(_) => "Tool not found".to_string(),
            ApiError::NoFileSelected { .. } => "No file selected".to_string(),
            ApiError::PayloadTooLarge { limit } => {
                format!("File too large. Max is {} MB", limit.as_megabytes())
            }
            ApiError::InvalidUpload(detail) => format!("Invalid upload: {detail}"),
            ApiError::Conversion { .. } => CONVERSION_FAILED_MESSAGE.to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::NoFileSelected { tool_id } = &self {
            return Redirect::to(&format!("/tool/{tool_id}")).into_response();
        }

        (self.status_code(), self.public_message()).into_response()
    }
}

impl From<NotFound> for ApiError {
    fn from(value: NotFound) -> Self {
        ApiError::UnknownTool(value.0)
    }
}

impl From<askama::Error> for ApiError {
    fn from(value: askama::Error) -> Self {
        ApiError::Internal(format!("template rendering failed: {value}"))
    }
}
