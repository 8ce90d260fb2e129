//! FFmpeg CLI wrapper for video-to-GIF conversion.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe duration and frame-rate lookup
//! - The fixed GIF recipe (10 fps cap, 320 px wide)
//! - A `Transcoder` capability trait with an FFmpeg-backed implementation

pub mod command;
pub mod error;
pub mod gif;
pub mod probe;
pub mod progress;
pub mod transcoder;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use gif::{GifSpec, GIF_EXTENSION, GIF_MAX_FPS, GIF_WIDTH};
pub use probe::{probe_video, VideoInfo};
pub use progress::{FfmpegProgress, PercentCallback};
pub use transcoder::{FfmpegTranscoder, Transcoder};
