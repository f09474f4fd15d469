//! Shared time axis between rendering and hit-testing

use crate::error::{CueError, CueResult};

/// Linear mapping between track time (seconds) and surface x (pixels).
///
/// Build a fresh axis whenever the surface width or track duration changes;
/// markers, playhead and pointer input must all go through the same one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pixel_width: u32,
    duration: f64,
}

impl TimeAxis {
    pub fn new(pixel_width: u32, duration_secs: f64) -> CueResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(CueError::InvalidAxis {
                duration: duration_secs,
            });
        }
        if pixel_width == 0 {
            return Err(CueError::InvalidDimensions(
                "time axis needs a non-zero pixel width".to_string(),
            ));
        }

        Ok(Self {
            pixel_width,
            duration: duration_secs,
        })
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Time to x, clamped to `[0, pixel_width]`
    pub fn time_to_x(&self, seconds: f64) -> f64 {
        let t = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.duration)
        };
        t / self.duration * self.pixel_width as f64
    }

    /// X to time, clamped to `[0, duration]`
    pub fn x_to_time(&self, x: f64) -> f64 {
        let width = self.pixel_width as f64;
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, width) };
        x / width * self.duration
    }
}
