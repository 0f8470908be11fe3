use super::error::SplitError;

/// Tolerance (in milliseconds) applied before flooring so that values like
/// `1.005`, stored just below the millisecond in binary, keep their digit.
const MILLIS_TOLERANCE: f64 = 1e-6;

/// Format seconds as an ffmpeg timestamp (`HH:MM:SS.mmm`).
///
/// Hours are not wrapped at 24 and milliseconds are truncated. Every
/// component is derived from a single integer millisecond count, so a value
/// just below a whole second never rolls over into the next one.
pub fn format_timestamp(seconds: f64) -> Result<String, SplitError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SplitError::InvalidArgument(format!(
            "timestamp must be a finite, non-negative number of seconds (got {seconds})"
        )));
    }

    let total_millis = (seconds * 1000.0 + MILLIS_TOLERANCE).floor() as u64;
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    Ok(format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}"))
}

/// Parse `H:MM:SS(.fff)` back into seconds.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;

    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return None;
    }

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
