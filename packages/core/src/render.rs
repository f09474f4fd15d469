//! Waveform rasterization
//!
//! Draws the amplitude profile, cue markers and playhead into an RGBA
//! surface. Every call repaints the whole surface, so rendering the same
//! inputs twice gives the same pixels.

use crate::axis::TimeAxis;
use crate::color::Color;
use crate::config::{EditorConfig, Palette};
use crate::error::{CueError, CueResult};
use crate::project::Cue;
use crate::waveform::WaveformProfile;

/// RGBA8 raster, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> CueResult<Self> {
        if width == 0 || height == 0 {
            return Err(CueError::InvalidDimensions(format!(
                "surface must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Paint rows `y_start..y_end` of column `x`; out-of-bounds parts are clipped.
    fn fill_column(&mut self, x: u32, y_start: u32, y_end: u32, color: Color) {
        if x >= self.width {
            return;
        }
        let rgba = color.to_rgba();
        for y in y_start..y_end.min(self.height) {
            let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
            self.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    /// Full-height line centred on `x`, `line_width` pixels wide.
    ///
    /// Covers columns `floor(x - w/2) ..= ceil(x + w/2) - 1`, clipped to the
    /// surface, so a line at `x == width` lands on the last column.
    fn vertical_line(&mut self, x: f64, line_width: f64, color: Color) {
        let last = self.width as i64 - 1;
        let half = line_width / 2.0;
        let start = ((x - half).floor() as i64).clamp(0, last);
        let end = (((x + half).ceil() as i64) - 1).clamp(0, last).max(start);

        for column in start..=end {
            self.fill_column(column as u32, 0, self.height, color);
        }
    }
}

/// Line widths and colors for one renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub palette: Palette,
    pub marker_width: f64,
    pub playhead_width: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl RenderStyle {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            palette: config.palette,
            marker_width: config.marker_width,
            playhead_width: config.playhead_width,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaveformRenderer {
    style: RenderStyle,
}

impl WaveformRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Background only, for when no track is loaded
    pub fn clear(&self, surface: &mut Surface) {
        surface.fill(self.style.palette.background);
    }

    /// Repaint `surface`: background, profile, cue markers, then playhead.
    ///
    /// Never fails; cues whose position is not a finite number are skipped.
    pub fn render(
        &self,
        surface: &mut Surface,
        profile: &WaveformProfile,
        axis: &TimeAxis,
        cues: &[Cue],
        playhead: Option<f64>,
    ) {
        self.clear(surface);
        self.draw_profile(surface, profile);

        for (index, cue) in cues.iter().enumerate() {
            if !cue.position.is_finite() {
                tracing::warn!(
                    "Skipping marker for cue {} ('{}'): position {} is not drawable",
                    index,
                    cue.display_name(),
                    cue.position
                );
                continue;
            }
            let x = axis.time_to_x(cue.position);
            surface.vertical_line(x, self.style.marker_width, cue.color);
        }

        if let Some(seconds) = playhead {
            if seconds.is_finite() {
                surface.vertical_line(
                    axis.time_to_x(seconds),
                    self.style.playhead_width,
                    self.style.palette.playhead,
                );
            } else {
                tracing::warn!("Skipping playhead at non-finite position {}", seconds);
            }
        }
    }

    fn draw_profile(&self, surface: &mut Surface, profile: &WaveformProfile) {
        let height = surface.height() as f64;
        let center = height / 2.0;
        let color = self.style.palette.waveform;

        for (column, bin) in profile.bins().iter().enumerate() {
            if column >= surface.width() as usize {
                break;
            }

            let max_y = center - bin.max as f64 * center;
            let min_y = center - bin.min as f64 * center;
            let top = max_y.floor().clamp(0.0, height);
            let bottom = min_y.ceil().clamp(0.0, height);
            let y_start = top.min(height - 1.0) as u32;
            // at least one pixel so silence still shows a centre line
            let y_end = (bottom as u32).max(y_start + 1);

            surface.fill_column(column as u32, y_start, y_end, color);
        }
    }
}
