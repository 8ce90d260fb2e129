//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use gifcast_media::{check_ffmpeg, check_ffprobe, FfmpegTranscoder, Transcoder};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::{Converter, ProgressHub, StampGenerator, StorageLayout};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<StorageLayout>,
    pub stamps: Arc<StampGenerator>,
    pub progress: ProgressHub,
    pub converter: Converter,
}

impl AppState {
    /// Create application state backed by the system FFmpeg.
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        match check_ffmpeg() {
            Ok(path) => info!("Using ffmpeg at {}", path.display()),
            Err(e) => warn!("{}; conversions will fail until it is installed", e),
        }
        if let Err(e) = check_ffprobe() {
            warn!("{}; progress percentages will be unavailable", e);
        }

        Self::with_transcoder(config, Arc::new(FfmpegTranscoder::new())).await
    }

    /// Create application state with an explicit transcoder.
    ///
    /// Creates the upload and public directories if they are missing.
    pub async fn with_transcoder(
        config: ApiConfig,
        transcoder: Arc<dyn Transcoder>,
    ) -> ApiResult<Self> {
        let storage = Arc::new(StorageLayout::new(
            config.upload_dir.clone(),
            config.public_dir.clone(),
        ));
        storage.ensure_dirs().await?;

        if !storage.landing_page().exists() {
            warn!(
                "Landing page {} is missing; GET / will return 404",
                storage.landing_page().display()
            );
        }

        let stamps = Arc::new(StampGenerator::new());
        let progress = ProgressHub::new(config.progress_buffer);
        let converter = Converter::new(
            transcoder,
            progress.clone(),
            Arc::clone(&storage),
            Arc::clone(&stamps),
        );

        Ok(Self {
            config,
            storage,
            stamps,
            progress,
            converter,
        })
    }
}
