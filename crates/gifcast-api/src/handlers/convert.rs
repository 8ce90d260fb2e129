//! Video-to-GIF conversion handler.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::debug;

use gifcast_models::ConvertResponse;

use crate::error::{ApiError, ApiResult};
use crate::services::receive_upload;
use crate::state::AppState;

/// `POST /convert` with a multipart `video` file field.
///
/// Responds with `{ success, gifUrl }` once the GIF is written. A request
/// that is not multipart at all is treated the same as one without a file.
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ConvertResponse>> {
    let multipart = multipart.map_err(|rejection| {
        debug!("Rejected non-multipart convert request: {}", rejection);
        ApiError::MissingFile
    })?;

    let form = receive_upload(
        multipart,
        &state.storage,
        &state.stamps,
        state.config.max_upload_bytes,
    )
    .await?;

    let upload = form.upload.ok_or(ApiError::MissingFile)?;

    let response = state.converter.convert(upload, form.conversion_id).await?;
    Ok(Json(response))
}
