//! FFmpeg progress parsing.

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FfmpegProgress {
    /// Output time in milliseconds
    pub out_time_ms: i64,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).clamp(0.0, 100.0)
    }
}

/// Callback receiving completion percentages (0-100).
pub type PercentCallback = Box<dyn Fn(f64) + Send + 'static>;

/// Parse one line of FFmpeg's `-progress` output into `current`.
///
/// Returns a snapshot when the line closes a progress block
/// (`progress=continue` or `progress=end`). Keys other than the output
/// time are skipped.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_ms" | "out_time_us" => {
            // Both keys carry microseconds in practice
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
            None
        }
        "progress" => Some(*current),
        _ => None,
    }
}

/// Whether a stderr line belongs to the `-progress` key/value stream.
pub(crate) fn is_progress_line(line: &str) -> bool {
    match line.trim().split_once('=') {
        Some((key, _)) => !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress { out_time_ms: 5000 };

        assert!((progress.percentage(10000) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5000) - 100.0).abs() < 0.01);
        assert!((progress.percentage(2500) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0), 0.0);
    }

    #[test]
    fn test_negative_out_time_clamps_to_zero() {
        // FFmpeg reports a negative out_time before the first frame is muxed
        let progress = FfmpegProgress { out_time_ms: -1 };
        assert_eq!(progress.percentage(10000), 0.0);
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(parse_progress_line("frame=42", &mut progress).is_none());
        assert!(parse_progress_line("out_time_us=5000000", &mut progress).is_none());
        assert_eq!(progress.out_time_ms, 5000);

        // Unparseable values leave the last known time
        parse_progress_line("out_time_us=N/A", &mut progress);
        assert_eq!(progress.out_time_ms, 5000);

        let snapshot = parse_progress_line("progress=continue", &mut progress).unwrap();
        assert_eq!(snapshot.out_time_ms, 5000);

        parse_progress_line("out_time_ms=7500000", &mut progress);
        let last = parse_progress_line("progress=end", &mut progress).unwrap();
        assert_eq!(last.out_time_ms, 7500);
    }

    #[test]
    fn test_is_progress_line() {
        assert!(is_progress_line("out_time_us=100"));
        assert!(is_progress_line("progress=end"));
        assert!(!is_progress_line("Invalid data found when processing input"));
        assert!(!is_progress_line("[gif @ 0x55] some = thing"));
    }
}
