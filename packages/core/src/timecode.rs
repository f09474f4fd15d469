//! Conversion between float seconds and `MM:SS.mmm` timecodes
//!
//! Cues store only float seconds; the timecode string is always derived
//! from that value, so the two representations can never disagree.

use crate::error::{CueError, CueResult};

/// Guard against binary representation error when truncating to whole
/// milliseconds (12.345 * 1000.0 lands just below 12345.0).
const MS_EPSILON: f64 = 1e-6;

/// Format seconds as `MM:SS.mmm`, truncating sub-millisecond precision.
///
/// Minutes are padded to at least two digits and keep counting past 99.
pub fn seconds_to_timecode(seconds: f64) -> CueResult<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CueError::invalid_time(format!(
            "{} cannot be formatted as a timecode",
            seconds
        )));
    }

    let total_ms = (seconds * 1000.0 + MS_EPSILON).floor() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    Ok(format!("{:02}:{:02}.{:03}", minutes, secs, millis))
}

/// Parse `MM:SS.mmm` (or `MM:SS`) back into seconds.
pub fn timecode_to_seconds(timecode: &str) -> CueResult<f64> {
    let trimmed = timecode.trim();
    let invalid = || CueError::invalid_time(format!("'{}' is not a MM:SS.mmm timecode", timecode));

    let (minutes, rest) = trimmed.split_once(':').ok_or_else(invalid)?;
    let (secs, fraction) = match rest.split_once('.') {
        Some((secs, fraction)) => (secs, Some(fraction)),
        None => (rest, None),
    };

    let minutes = parse_digits(minutes, usize::MAX).ok_or_else(invalid)?;
    let secs = parse_digits(secs, 2).ok_or_else(invalid)?;
    if secs >= 60 {
        return Err(invalid());
    }

    let millis = match fraction {
        Some(fraction) => {
            let value = parse_digits(fraction, 3).ok_or_else(invalid)?;
            // ".5" means 500ms, ".05" means 50ms
            value * 10u64.pow(3 - fraction.len() as u32)
        }
        None => 0,
    };

    let total_ms = minutes
        .checked_mul(60_000)
        .and_then(|ms| ms.checked_add(secs * 1000 + millis))
        .ok_or_else(invalid)?;

    Ok(total_ms as f64 / 1000.0)
}

/// Format a playback position for the time display; never fails.
///
/// Negative or NaN positions (transport not started yet) show as zero.
pub fn format_timecode_lossy(seconds: f64) -> String {
    let clamped = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    seconds_to_timecode(clamped).unwrap_or_else(|_| "00:00.000".to_string())
}

fn parse_digits(text: &str, max_len: usize) -> Option<u64> {
    if text.is_empty() || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
