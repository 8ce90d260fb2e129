//! Multipart upload handling for `/convert`.
//!
//! The `video` file field is streamed to the upload directory while its size
//! is counted. Anything past the limit aborts the request with 413 and the
//! partial file is removed, so no transcoding is ever attempted on it.

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use gifcast_models::ConversionId;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::{StampGenerator, StorageLayout};

/// Multipart field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Optional multipart field naming the progress scope.
pub const CONVERSION_ID_FIELD: &str = "conversionId";

/// An upload persisted to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub original_name: Option<String>,
    pub size: u64,
}

/// Parsed `/convert` form.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub upload: Option<StoredUpload>,
    pub conversion_id: Option<ConversionId>,
}

/// Read the multipart body, storing the `video` field on disk.
///
/// On any error the already-stored upload is removed before returning.
pub async fn receive_upload(
    mut multipart: Multipart,
    storage: &StorageLayout,
    stamps: &StampGenerator,
    max_bytes: usize,
) -> ApiResult<ConvertForm> {
    let mut form = ConvertForm::default();

    if let Err(e) = read_fields(&mut multipart, &mut form, storage, stamps, max_bytes).await {
        if let Some(upload) = form.upload.take() {
            storage.remove_upload(&upload.path).await;
        }
        return Err(e);
    }

    Ok(form)
}

async fn read_fields(
    multipart: &mut Multipart,
    form: &mut ConvertForm,
    storage: &StorageLayout,
    stamps: &StampGenerator,
    max_bytes: usize,
) -> ApiResult<()> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        match (name.as_str(), is_file) {
            (VIDEO_FIELD, true) => {
                if form.upload.is_some() {
                    return Err(ApiError::bad_request("Unexpected field"));
                }
                let original_name = field.file_name().map(str::to_string);
                let path = storage.upload_path(stamps.next(), original_name.as_deref());
                let size = persist_field(field, &path, max_bytes).await?;

                debug!(path = %path.display(), size, "Stored upload");
                metrics::record_upload_bytes(size);
                form.upload = Some(StoredUpload {
                    path,
                    original_name,
                    size,
                });
            }
            (CONVERSION_ID_FIELD, false) => {
                let text = field.text().await?;
                let id = ConversionId::parse(text.trim())
                    .map_err(|e| ApiError::bad_request(format!("Invalid conversionId: {}", e)))?;
                form.conversion_id = Some(id);
            }
            (_, true) => {
                return Err(ApiError::bad_request("Unexpected field"));
            }
            // Unknown text fields are ignored
            (_, false) => {
                let _ = field.bytes().await?;
            }
        }
    }

    Ok(())
}

/// Stream one field to `path`, enforcing `max_bytes`.
async fn persist_field(mut field: Field<'_>, path: &Path, max_bytes: usize) -> ApiResult<u64> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;

    let result: ApiResult<()> = async {
        while let Some(chunk) = field.chunk().await? {
            written += chunk.len() as u64;
            if written > max_bytes as u64 {
                return Err(ApiError::PayloadTooLarge {
                    limit_bytes: max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove_err, "Failed to remove partial upload");
        }
        return Err(e);
    }

    Ok(written)
}
