//! Transcoding capability.
//!
//! A `Transcoder` turns an input file into a GIF at a destination path,
//! reporting completion percentages along the way and finishing with exactly
//! one terminal outcome.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::FfmpegRunner;
use crate::error::MediaResult;
use crate::gif::GifSpec;
use crate::probe::probe_video;
use crate::progress::PercentCallback;

/// Converts a stored upload into an animated GIF.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert `input` into a GIF written to `output`.
    ///
    /// `on_progress` receives percentages (0-100) while the conversion runs.
    /// It is never called after this future resolves.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        on_progress: PercentCallback,
    ) -> MediaResult<()>;
}

/// `Transcoder` backed by the `ffmpeg`/`ffprobe` binaries on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        on_progress: PercentCallback,
    ) -> MediaResult<()> {
        let runner = FfmpegRunner::new()?;

        // A failed probe is not fatal: FFmpeg decides whether the input is
        // convertible, we only lose the percentage reporting.
        let (duration_ms, source_fps) = match probe_video(input).await {
            Ok(info) => (info.duration_ms(), info.fps),
            Err(e) => {
                warn!(input = %input.display(), error = %e, "FFprobe failed, converting without progress");
                (0, None)
            }
        };

        let spec = GifSpec::for_source(source_fps);
        debug!(
            input = %input.display(),
            output = %output.display(),
            fps = spec.fps,
            width = spec.width,
            duration_ms,
            "Starting GIF conversion"
        );

        let cmd = spec.command(input, output);
        runner
            .run_with_progress(&cmd, move |progress| {
                if duration_ms > 0 {
                    on_progress(progress.percentage(duration_ms));
                }
            })
            .await
    }
}
