//! Downsampling of decoded audio into a per-column amplitude profile
//!
//! The profile is a pure rendering cache: one min/max pair per pixel column,
//! recomputed only when the audio buffer or the target width changes.

use crate::error::{CueError, CueResult};

/// Min and max sample value for one pixel column, both in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmplitudeBin {
    pub min: f32,
    pub max: f32,
}

/// Downsampled waveform, exactly one bin per pixel column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveformProfile {
    bins: Vec<AmplitudeBin>,
}

impl WaveformProfile {
    pub fn bins(&self) -> &[AmplitudeBin] {
        &self.bins
    }

    pub fn width(&self) -> usize {
        self.bins.len()
    }

    /// Largest absolute amplitude in the profile
    pub fn peak(&self) -> f32 {
        self.bins
            .iter()
            .map(|bin| bin.min.abs().max(bin.max.abs()))
            .fold(0.0, f32::max)
    }
}

/// Reduce `buffer` to exactly `width` min/max bins.
///
/// The buffer is split into windows of `ceil(len / width)` samples. When the
/// buffer runs out before the last columns (short buffers, or ceil rounding),
/// those columns take the single sample at their proportional position, so
/// no column is empty unless the buffer itself is.
pub fn sample(buffer: &[f32], width: usize) -> CueResult<WaveformProfile> {
    if width == 0 {
        return Err(CueError::InvalidDimensions(
            "waveform width must be at least one column".to_string(),
        ));
    }

    if buffer.is_empty() {
        return Ok(WaveformProfile {
            bins: vec![AmplitudeBin::default(); width],
        });
    }

    let len = buffer.len();
    let window = len.div_ceil(width);
    let mut bins = Vec::with_capacity(width);

    for column in 0..width {
        let start = column * window;
        let end = ((column + 1) * window).min(len);

        let bin = if start < end {
            summarize(&buffer[start..end])
        } else {
            let index = (column * len / width).min(len - 1);
            let value = normalize(buffer[index]);
            AmplitudeBin {
                min: value,
                max: value,
            }
        };
        bins.push(bin);
    }

    Ok(WaveformProfile { bins })
}

fn summarize(window: &[f32]) -> AmplitudeBin {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &raw in window {
        let value = normalize(raw);
        min = min.min(value);
        max = max.max(value);
    }
    AmplitudeBin { min, max }
}

/// Clamp to [-1, 1]; NaN counts as silence
fn normalize(sample: f32) -> f32 {
    if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    }
}

#[derive(Debug)]
struct CachedProfile {
    buffer_id: u64,
    width: usize,
    profile: WaveformProfile,
}

/// Caches the profile for one `(buffer identity, width)` pair.
///
/// Callers pass a buffer id that changes whenever a new file is loaded; a
/// resize changes the width. Either change invalidates the cache.
#[derive(Debug, Default)]
pub struct ProfileCache {
    cached: Option<CachedProfile>,
    computations: u64,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        buffer_id: u64,
        buffer: &[f32],
        width: usize,
    ) -> CueResult<&WaveformProfile> {
        let valid = matches!(
            &self.cached,
            Some(cached) if cached.buffer_id == buffer_id && cached.width == width
        );

        if !valid {
            let profile = sample(buffer, width)?;
            self.computations += 1;
            tracing::debug!(
                buffer_id,
                width,
                samples = buffer.len(),
                "Recomputed waveform profile"
            );
            self.cached = Some(CachedProfile {
                buffer_id,
                width,
                profile,
            });
        }

        match &self.cached {
            Some(cached) => Ok(&cached.profile),
            None => Err(CueError::InvalidDimensions(
                "waveform profile missing after compute".to_string(),
            )),
        }
    }

    pub fn is_cached_for(&self, buffer_id: u64, width: usize) -> bool {
        matches!(
            &self.cached,
            Some(cached) if cached.buffer_id == buffer_id && cached.width == width
        )
    }

    /// How many times a profile has been computed (cache misses)
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
