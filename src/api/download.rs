use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::convert::ConversionResult;

/// Serve a conversion result as a file download.
pub fn attachment(result: ConversionResult) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        result.download_name.replace(['"', '\\'], "_")
    );

    (
        [
            (header::CONTENT_TYPE, result.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.bytes,
    )
        .into_response()
}
