use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::HeaderMap,
    response::{Html, Response},
};
use tracing::{debug, error, info, warn};

use super::{download, error::ApiError, pages, state::AppState};
use crate::upload::{UploadError, UploadScope, check_content_length, receive_files};

/// Upload form for one tool (GET /tool/{id})
pub async fn tool_page(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let tool = state.catalog.lookup(&tool_id)?;
    pages::tool(&state.config, tool)
}

/// Conversion endpoint (POST /tool/{id})
///
/// ## Flow:
/// 1. Resolve the tool id; unknown ids are a 404 before the body is read
/// 2. Reject a declared `Content-Length` over the limit
/// 3. Buffer the multipart body, then persist the parts into an [`UploadScope`]
/// 4. Run the converter in a spawned task that owns the scope, so the
///    uploads are removed even if the client goes away mid-conversion
/// 5. Return the result as an attachment
pub async fn submit_tool(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let tool = state.catalog.lookup(&tool_id)?;
    let uploads = &state.config.uploads;

    check_content_length(&headers, uploads.max_upload_size)
        .map_err(|err| reject_upload(&state, tool.id, err))?;

    // Without a multipart body there is nothing selected, same as an empty file field.
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(tool = tool.id, %rejection, "Request carried no multipart body");
            return Err(ApiError::NoFileSelected {
                tool_id: tool.id.to_string(),
            });
        }
    };

    let scope = receive_files(multipart, tool, uploads)
        .await
        .map_err(|err| reject_upload(&state, tool.id, err))?;

    let started = Instant::now();
    let outcome = tokio::spawn(convert_and_release(state.clone(), tool.id, scope))
        .await
        .map_err(|e| ApiError::Internal(format!("conversion task failed: {e}")))?;

    match outcome {
        Ok(result) => {
            state.metrics.conversion_succeeded();
            info!(
                tool = tool.id,
                bytes = result.bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Conversion succeeded"
            );
            Ok(download::attachment(result))
        }
        Err(source) => {
            state.metrics.conversion_failed();
            let err = ApiError::Conversion {
                tool: tool.id.to_string(),
                source,
            };
            error!(
                tool = tool.id,
                code = err.code(),
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Conversion failed"
            );
            Err(err)
        }
    }
}

async fn convert_and_release(
    state: AppState,
    tool_id: &'static str,
    scope: UploadScope,
) -> Result<crate::convert::ConversionResult, crate::convert::ConversionError> {
    let outcome = state.converters.convert(tool_id, &scope.paths()).await;
    scope.release().await;
    outcome
}

fn reject_upload(state: &AppState, tool_id: &str, err: UploadError) -> ApiError {
    let counted = !matches!(err, UploadError::NoFiles);
    let detail = err.to_string();
    let api_error = ApiError::from_upload(tool_id, err);
    if counted {
        state.metrics.upload_rejected();
        warn!(tool = tool_id, code = api_error.code(), error = %detail, "Upload rejected");
    }
    api_error
}
