//! Cue hit-testing
//!
//! Two separate proximity checks live here: a pixel tolerance for pointer
//! hover/click, and a time window for the playback flash.

use crate::axis::TimeAxis;
use crate::project::Cue;

/// Pointer hit tolerance, in pixels
pub const HOVER_TOLERANCE_PX: f64 = 5.0;

/// Playback flash window, in seconds
pub const FLASH_WINDOW_SECS: f64 = 0.1;

/// A cue found by the locator, with its storage index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueHit<'a> {
    pub index: usize,
    pub cue: &'a Cue,
    /// Absolute pixel distance from the pointer
    pub distance: f64,
}

/// Nearest cue to `pointer_x` within `tolerance_px`.
///
/// Equal distances resolve to the cue earliest in storage order.
pub fn find_nearest<'a>(
    cues: &'a [Cue],
    axis: &TimeAxis,
    pointer_x: f64,
    tolerance_px: f64,
) -> Option<CueHit<'a>> {
    if pointer_x.is_nan() {
        return None;
    }

    let mut best: Option<CueHit<'a>> = None;
    for (index, cue) in cues.iter().enumerate() {
        if !cue.position.is_finite() {
            continue;
        }

        let distance = (axis.time_to_x(cue.position) - pointer_x).abs();
        let closer = match &best {
            Some(current) => distance < current.distance,
            None => true,
        };
        if closer {
            best = Some(CueHit {
                index,
                cue,
                distance,
            });
        }
    }

    best.filter(|hit| hit.distance <= tolerance_px)
}

/// First cue (storage order) whose position is within `window_secs` of
/// `seconds`.
pub fn cue_near_time(cues: &[Cue], seconds: f64, window_secs: f64) -> Option<(usize, &Cue)> {
    if !seconds.is_finite() {
        return None;
    }
    cues.iter()
        .enumerate()
        .find(|(_, cue)| (cue.position - seconds).abs() < window_secs)
}
