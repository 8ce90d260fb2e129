//! Upload-to-GIF conversion service.
//!
//! Bridges a stored upload to the transcoder, the progress hub and the HTTP
//! response. The upload is deleted in every terminal path. A failed
//! conversion may leave a partial GIF in the public directory; it is logged
//! but not removed, and successful outputs are never expired.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn, Instrument};

use gifcast_media::{PercentCallback, Transcoder};
use gifcast_models::{ConversionId, ConvertResponse};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::{ProgressHub, StampGenerator, StorageLayout, StoredUpload};

/// Drives one conversion per `/convert` request.
#[derive(Clone)]
pub struct Converter {
    transcoder: Arc<dyn Transcoder>,
    hub: ProgressHub,
    storage: Arc<StorageLayout>,
    stamps: Arc<StampGenerator>,
}

impl Converter {
    pub fn new(
        transcoder: Arc<dyn Transcoder>,
        hub: ProgressHub,
        storage: Arc<StorageLayout>,
        stamps: Arc<StampGenerator>,
    ) -> Self {
        Self {
            transcoder,
            hub,
            storage,
            stamps,
        }
    }

    /// Convert `upload` and return the public URL of the GIF.
    ///
    /// The work runs on its own task: if the client disconnects the
    /// conversion still finishes and cleans up, its result is just dropped.
    pub async fn convert(
        &self,
        upload: StoredUpload,
        conversion_id: Option<ConversionId>,
    ) -> ApiResult<ConvertResponse> {
        let input = upload.path.clone();
        let this = self.clone();
        match tokio::spawn(async move { this.run(upload, conversion_id).await }).await {
            Ok(result) => result,
            Err(e) => {
                // The task died before its own cleanup ran
                error!(input = %input.display(), error = %e, "Conversion task aborted");
                metrics::record_conversion_finished(metrics::OUTCOME_FAILURE, 0.0);
                self.storage.remove_upload(&input).await;
                Err(ApiError::internal(format!("Conversion task failed: {}", e)))
            }
        }
    }

    async fn run(
        &self,
        upload: StoredUpload,
        conversion_id: Option<ConversionId>,
    ) -> ApiResult<ConvertResponse> {
        let stamp = self.stamps.next();
        let file_name = self.storage.output_file_name(stamp);
        let output = self.storage.output_path(&file_name);

        let span = info_span!(
            "conversion",
            stamp,
            conversion_id = conversion_id.as_ref().map(|id| id.as_str()).unwrap_or("-")
        );

        async move {
            info!(
                input = %upload.path.display(),
                size = upload.size,
                original_name = upload.original_name.as_deref().unwrap_or("-"),
                "Conversion started"
            );
            metrics::record_conversion_started();

            let hub = self.hub.clone();
            let scope = conversion_id.clone();
            let on_progress: PercentCallback = Box::new(move |percent| {
                debug!(percent, "Processing");
                hub.progress(percent, scope.clone());
            });

            let start = Instant::now();
            let result = self
                .transcoder
                .transcode(&upload.path, &output, on_progress)
                .await;
            let elapsed = start.elapsed().as_secs_f64();

            self.storage.remove_upload(&upload.path).await;

            match result {
                Ok(()) => {
                    metrics::record_conversion_finished(metrics::OUTCOME_SUCCESS, elapsed);
                    info!(output = %output.display(), duration_secs = elapsed, "Conversion completed");
                    Ok(ConvertResponse::new(
                        self.storage.public_url(&file_name),
                        conversion_id,
                    ))
                }
                Err(e) => {
                    metrics::record_conversion_finished(metrics::OUTCOME_FAILURE, elapsed);
                    error!(
                        error = %e,
                        stderr = e.stderr().unwrap_or("-"),
                        duration_secs = elapsed,
                        "Conversion failed"
                    );
                    if tokio::fs::try_exists(&output).await.unwrap_or(false) {
                        warn!(output = %output.display(), "Partial output left in public directory");
                    }
                    Err(ApiError::Conversion(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;
    use gifcast_media::{MediaError, MediaResult};
    use gifcast_models::WsMessage;
    use tempfile::TempDir;

    /// Writes a fixed payload and reports a few percentages.
    struct StubTranscoder {
        fail: bool,
    }

    struct PanickingTranscoder;

    #[async_trait]
    impl Transcoder for PanickingTranscoder {
        async fn transcode(
            &self,
            _input: &Path,
            _output: &Path,
            _on_progress: PercentCallback,
        ) -> MediaResult<()> {
            panic!("decoder crashed");
        }
    }

    #[async_trait]
    impl Transcoder for StubTranscoder {
        async fn transcode(
            &self,
            _input: &Path,
            output: &Path,
            on_progress: PercentCallback,
        ) -> MediaResult<()> {
            on_progress(50.0);
            if self.fail {
                tokio::fs::write(output, b"GIF8").await?;
                return Err(MediaError::ffmpeg_failed("boom", None, Some(1)));
            }
            on_progress(100.0);
            tokio::fs::write(output, b"GIF89a").await?;
            Ok(())
        }
    }

    async fn setup(fail: bool) -> (TempDir, Converter, ProgressHub, StoredUpload) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(StorageLayout::new(
            dir.path().join("uploads"),
            dir.path().join("public"),
        ));
        storage.ensure_dirs().await.unwrap();

        let hub = ProgressHub::new(16);
        let converter = Converter::new(
            Arc::new(StubTranscoder { fail }),
            hub.clone(),
            Arc::clone(&storage),
            Arc::new(StampGenerator::new()),
        );

        let path = storage.upload_path(1, Some("clip.mp4"));
        tokio::fs::write(&path, b"not really a video").await.unwrap();
        let upload = StoredUpload {
            path,
            original_name: Some("clip.mp4".to_string()),
            size: 18,
        };

        (dir, converter, hub, upload)
    }

    #[tokio::test]
    async fn test_success_removes_upload_and_returns_url() {
        let (dir, converter, hub, upload) = setup(false).await;
        let mut listener = hub.subscribe(None);
        let input = upload.path.clone();

        let resp = converter.convert(upload, None).await.unwrap();

        assert!(resp.success);
        assert!(resp.gif_url.starts_with("/public/"));
        assert!(resp.gif_url.ends_with(".gif"));
        assert!(!input.exists());

        let name = resp.gif_url.trim_start_matches("/public/");
        assert!(dir.path().join("public").join(name).exists());

        let first = listener.next().await.unwrap();
        assert!(matches!(first, WsMessage::Progress { data, .. } if data == 50.0));
    }

    #[tokio::test]
    async fn test_failure_removes_upload_keeps_partial_output() {
        let (dir, converter, _hub, upload) = setup(true).await;
        let input = upload.path.clone();

        let err = converter.convert(upload, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Conversion(_)));
        assert!(!input.exists());

        let leftovers = std::fs::read_dir(dir.path().join("public")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_panicking_transcoder_still_removes_upload() {
        let (_dir, converter, _hub, upload) = setup(false).await;
        let converter = Converter {
            transcoder: Arc::new(PanickingTranscoder),
            ..converter
        };
        let input = upload.path.clone();

        let err = converter.convert(upload, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
        assert!(!input.exists());
    }

    #[tokio::test]
    async fn test_scope_is_attached_to_progress_and_response() {
        let (_dir, converter, hub, upload) = setup(false).await;
        let id = ConversionId::parse("abc").unwrap();
        let mut scoped = hub.subscribe(Some(id.clone()));

        let resp = converter.convert(upload, Some(id.clone())).await.unwrap();
        assert_eq!(resp.conversion_id, Some(id.clone()));

        let msg = scoped.next().await.unwrap();
        assert_eq!(msg.conversion_id(), Some(&id));
    }
}
