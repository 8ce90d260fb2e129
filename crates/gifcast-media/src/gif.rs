//! The fixed GIF recipe.
//!
//! Every conversion uses the same parameters: at most 10 frames per second,
//! 320 px wide with the source aspect ratio, GIF container.

use std::path::Path;

use crate::command::FfmpegCommand;

/// Frame-rate ceiling for generated GIFs.
pub const GIF_MAX_FPS: f64 = 10.0;

/// Output width in pixels; height follows the source aspect ratio.
pub const GIF_WIDTH: u32 = 320;

/// Output container format.
pub const GIF_FORMAT: &str = "gif";

/// Output file extension (without the dot).
pub const GIF_EXTENSION: &str = "gif";

/// Resolved GIF parameters for one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifSpec {
    /// Output frame rate
    pub fps: f64,
    /// Output width in pixels
    pub width: u32,
}

impl Default for GifSpec {
    fn default() -> Self {
        Self {
            fps: GIF_MAX_FPS,
            width: GIF_WIDTH,
        }
    }
}

impl GifSpec {
    /// Resolve the recipe for a source with the given frame rate.
    ///
    /// Sources slower than the ceiling keep their own rate so frames are
    /// never duplicated; unknown rates use the ceiling.
    pub fn for_source(source_fps: Option<f64>) -> Self {
        let fps = match source_fps {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate.min(GIF_MAX_FPS),
            _ => GIF_MAX_FPS,
        };
        Self {
            fps,
            width: GIF_WIDTH,
        }
    }

    /// The `-vf` filter chain for this recipe.
    pub fn filter(&self) -> String {
        format!("fps={},scale={}:-1", format_rate(self.fps), self.width)
    }

    /// Build the FFmpeg command converting `input` to a GIF at `output`.
    pub fn command(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .video_filter(self.filter())
            .no_audio()
            .format(GIF_FORMAT)
    }
}

/// Render a frame rate without trailing zeros ("10", "7.5", "5.994").
fn format_rate(fps: f64) -> String {
    let s = format!("{:.3}", fps);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
