//! Editor session
//!
//! One `Session` per open editor. It owns the project, the loaded track and
//! everything derived from it, and exposes one handler per external event
//! (decode finished, playback tick, pointer, edits). Handlers only mark the
//! surface dirty; the host calls [`Session::render_frame`] once per animation
//! frame to repaint.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::axis::TimeAxis;
use crate::color::Color;
use crate::config::EditorConfig;
use crate::cue_store::{CueField, CueStore};
use crate::decode::{AudioDecoder, DecodedAudio};
use crate::document::ImportReport;
use crate::error::{CueError, CueResult};
use crate::locator::{cue_near_time, find_nearest};
use crate::project::{Cue, Page, Project};
use crate::render::{RenderStyle, Surface, WaveformRenderer};
use crate::timecode::{format_timecode_lossy, timecode_to_seconds};
use crate::waveform::ProfileCache;

/// Banner offset above the pointer, in pixels
const BANNER_OFFSET_Y: f64 = 30.0;

/// Handle for one outstanding decode; results carrying an older
/// generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    generation: u64,
    file_name: String,
}

impl DecodeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Result of a playback tick, for the time display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub timecode: String,
    /// The time display should be highlighted
    pub flash: bool,
}

/// Label for the cue under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct HoverBanner {
    pub index: usize,
    pub label: String,
    pub color: Color,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// Audio file the document was made against, when it is not the one
    /// currently loaded
    pub relink: Option<String>,
}

/// Time-display highlight that switches itself off after a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashState {
    duration: Duration,
    until: Option<Instant>,
}

impl FlashState {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    /// Start (or extend) the flash from `now`
    pub fn trigger(&mut self, now: Instant) {
        self.until = Some(now + self.duration);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

#[derive(Debug)]
struct LoadedTrack {
    generation: u64,
    file_name: String,
    audio: DecodedAudio,
}

pub struct Session {
    config: EditorConfig,
    project: Project,
    track: Option<LoadedTrack>,
    generation: u64,
    pending_decode: Option<DecodeTicket>,
    cache: ProfileCache,
    renderer: WaveformRenderer,
    surface: Surface,
    playhead: Option<f64>,
    flash: FlashState,
    hovered: Option<usize>,
    notice: Option<String>,
    redraw_pending: bool,
}

impl Session {
    /// Fresh session with a single empty "Page 1" and no track.
    pub fn new(config: EditorConfig) -> CueResult<Self> {
        config.validate()?;
        let surface = Surface::new(config.canvas_width, config.canvas_height)?;

        Ok(Self {
            renderer: WaveformRenderer::new(RenderStyle::from_config(&config)),
            flash: FlashState::new(config.flash_duration()),
            config,
            project: Project::with_default_page(),
            track: None,
            generation: 0,
            pending_decode: None,
            cache: ProfileCache::new(),
            surface,
            playhead: None,
            hovered: None,
            notice: None,
            redraw_pending: true,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn track(&self) -> Option<&DecodedAudio> {
        self.track.as_ref().map(|t| &t.audio)
    }

    pub fn playhead(&self) -> Option<f64> {
        self.playhead
    }

    pub fn hovered_cue(&self) -> Option<usize> {
        self.hovered
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Number of waveform profiles computed so far
    pub fn profile_computations(&self) -> u64 {
        self.cache.computations()
    }

    /// Take the pending user-facing message, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Cues of the active page, storage order
    pub fn cues(&self) -> &[Cue] {
        self.project.active_cues()
    }

    /// Axis for the current surface width and track, if a track is loaded
    pub fn axis(&self) -> Option<TimeAxis> {
        let track = self.track.as_ref()?;
        TimeAxis::new(self.surface.width(), track.audio.duration_secs).ok()
    }

    fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }

    // Decoding

    /// Start a decode of `file_name`. Returns `None` when that file is
    /// already being decoded.
    pub fn begin_decode(&mut self, file_name: &str) -> Option<DecodeTicket> {
        if let Some(pending) = &self.pending_decode {
            if pending.file_name == file_name {
                tracing::debug!("Decode of '{}' already in progress", file_name);
                return None;
            }
        }

        self.generation += 1;
        let ticket = DecodeTicket {
            generation: self.generation,
            file_name: file_name.to_string(),
        };
        self.pending_decode = Some(ticket.clone());
        Some(ticket)
    }

    /// Abandon the pending decode, if any. A result that still arrives for
    /// it is discarded as stale.
    pub fn cancel_decode(&mut self) {
        if let Some(pending) = self.pending_decode.take() {
            self.generation += 1;
            tracing::debug!("Cancelled decode of '{}'", pending.file_name);
        }
    }

    /// Deliver a decode result.
    ///
    /// Returns `Ok(false)` when a newer decode has started since `ticket` was
    /// issued; the result is dropped and nothing changes.
    pub fn on_audio_decoded(
        &mut self,
        ticket: DecodeTicket,
        result: CueResult<DecodedAudio>,
    ) -> CueResult<bool> {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale decode of '{}' (generation {}, current {})",
                ticket.file_name,
                ticket.generation,
                self.generation
            );
            return Ok(false);
        }
        self.pending_decode = None;

        let audio = match result {
            Ok(audio) => audio,
            Err(e) => {
                let err = match e {
                    CueError::Decode(reason) => CueError::Decode(reason),
                    other => CueError::decode(other.to_string()),
                };
                tracing::warn!("Failed to decode '{}': {}", ticket.file_name, err);
                self.notice = err.user_notice();
                return Err(err);
            }
        };

        if !audio.duration_secs.is_finite() || audio.duration_secs <= 0.0 {
            let err = CueError::decode(format!("'{}' has no playable length", ticket.file_name));
            self.notice = err.user_notice();
            return Err(err);
        }

        tracing::info!(
            "Loaded '{}': {:.3}s at {} Hz",
            ticket.file_name,
            audio.duration_secs,
            audio.sample_rate
        );

        self.project.audio_file_name = Some(ticket.file_name.clone());
        self.track = Some(LoadedTrack {
            generation: ticket.generation,
            file_name: ticket.file_name,
            audio,
        });
        self.playhead = Some(0.0);
        self.hovered = None;
        self.flash.clear();
        self.request_redraw();
        Ok(true)
    }

    /// Decode `path` with `decoder` and install the result.
    ///
    /// Any decode still marked pending is superseded, including one left
    /// behind by a cancelled earlier call.
    pub async fn load_audio(&mut self, decoder: &dyn AudioDecoder, path: &Path) -> CueResult<bool> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.cancel_decode();
        let Some(ticket) = self.begin_decode(&file_name) else {
            return Ok(false);
        };
        let result = decoder.decode(path).await;
        self.on_audio_decoded(ticket, result)
    }

    // Playback and pointer

    pub fn on_playback_tick(&mut self, seconds: f64) -> TickOutcome {
        self.on_playback_tick_at(seconds, Instant::now())
    }

    /// Move the playhead and flash the time display when it passes a cue.
    pub fn on_playback_tick_at(&mut self, seconds: f64, now: Instant) -> TickOutcome {
        let seconds = match &self.track {
            Some(track) if seconds.is_finite() => seconds.clamp(0.0, track.audio.duration_secs),
            _ if seconds.is_finite() => seconds.max(0.0),
            _ => 0.0,
        };
        self.playhead = Some(seconds);

        let cues = self.project.active_cues();
        let window = self.config.flash_window_secs;
        if cue_near_time(cues, seconds, window).is_some() {
            self.flash.trigger(now);
        }

        self.request_redraw();
        TickOutcome {
            timecode: format_timecode_lossy(seconds),
            flash: self.flash.is_active(now),
        }
    }

    pub fn flash_active(&self) -> bool {
        self.flash_active_at(Instant::now())
    }

    pub fn flash_active_at(&self, now: Instant) -> bool {
        self.flash.is_active(now)
    }

    /// Banner for the cue within hover tolerance of the pointer, if any.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> Option<HoverBanner> {
        let Some(axis) = self.axis() else {
            self.hovered = None;
            return None;
        };

        let banner = find_nearest(
            self.project.active_cues(),
            &axis,
            x,
            self.config.hover_tolerance_px,
        )
        .map(|hit| HoverBanner {
            index: hit.index,
            label: hit.cue.display_name().to_string(),
            color: hit.cue.color,
            x,
            y: y - BANNER_OFFSET_Y,
        });

        self.hovered = banner.as_ref().map(|b| b.index);
        banner
    }

    pub fn on_pointer_leave(&mut self) {
        self.hovered = None;
    }

    /// Seek to the time under the pointer. `None` without a track.
    pub fn on_pointer_click(&mut self, x: f64, _y: f64) -> Option<f64> {
        let axis = self.axis()?;
        let seconds = axis.x_to_time(x);
        self.playhead = Some(seconds);
        self.request_redraw();
        Some(seconds)
    }

    // Cue editing

    /// Add a cue at the playhead (or 0 before playback has started),
    /// clamped to the track length.
    pub fn add_cue_at_playhead(&mut self) -> CueResult<Option<Cue>> {
        let mut position = self.playhead.unwrap_or(0.0);
        if let Some(track) = &self.track {
            position = position.min(track.audio.duration_secs);
        }

        let added = self.project.cue_store().add(position)?;
        if added.is_some() {
            self.request_redraw();
        }
        Ok(added)
    }

    /// Edit one field of a cue. With a track loaded, a time past its end is
    /// rejected.
    pub fn update_cue(&mut self, index: usize, field: CueField, value: &str) -> CueResult<()> {
        if let (CueField::Time, Some(track)) = (field, &self.track) {
            let seconds = timecode_to_seconds(value)?;
            if seconds > track.audio.duration_secs {
                return Err(CueError::invalid_time(format!(
                    "{} is past the end of the track ({:.3}s)",
                    value,
                    track.audio.duration_secs
                )));
            }
        }

        self.project.cue_store().update(index, field, value)?;
        self.request_redraw();
        Ok(())
    }

    pub fn remove_cue(&mut self, index: usize) -> CueResult<Cue> {
        let removed = self.project.cue_store().remove(index)?;
        self.hovered = None;
        self.request_redraw();
        Ok(removed)
    }

    /// Direct store access for read-heavy callers such as the cue table
    pub fn cue_store(&mut self) -> CueStore<'_> {
        self.project.cue_store()
    }

    // Pages

    pub fn add_page(&mut self, name: Option<&str>) -> usize {
        let index = self.project.add_page(name);
        self.after_page_change();
        index
    }

    pub fn remove_page(&mut self, index: usize) -> CueResult<Page> {
        let page = self.project.remove_page(index)?;
        self.after_page_change();
        Ok(page)
    }

    pub fn rename_page(&mut self, index: usize, name: &str) -> CueResult<()> {
        self.project.rename_page(index, name)?;
        self.request_redraw();
        Ok(())
    }

    pub fn set_page_color(&mut self, index: usize, hex: &str) -> CueResult<()> {
        self.project.set_page_color(index, hex)?;
        self.request_redraw();
        Ok(())
    }

    pub fn select_page(&mut self, index: usize) -> CueResult<()> {
        self.project.select_page(index)?;
        self.after_page_change();
        Ok(())
    }

    fn after_page_change(&mut self) {
        self.hovered = None;
        self.request_redraw();
    }

    // Surface

    pub fn resize(&mut self, width: u32, height: u32) -> CueResult<()> {
        self.surface = Surface::new(width, height)?;
        self.hovered = None;
        self.request_redraw();
        Ok(())
    }

    /// Repaint the surface if anything changed since the last frame.
    ///
    /// Returns whether a repaint happened.
    pub fn render_frame(&mut self) -> bool {
        if !self.redraw_pending {
            return false;
        }
        self.redraw_pending = false;

        let Some(track) = &self.track else {
            self.renderer.clear(&mut self.surface);
            return true;
        };

        let axis = match TimeAxis::new(self.surface.width(), track.audio.duration_secs) {
            Ok(axis) => axis,
            Err(e) => {
                tracing::warn!("Cannot map track to surface: {}", e);
                self.renderer.clear(&mut self.surface);
                return true;
            }
        };

        let profile = match self.cache.get_or_compute(
            track.generation,
            &track.audio.samples,
            self.surface.width() as usize,
        ) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Cannot compute waveform profile: {}", e);
                self.renderer.clear(&mut self.surface);
                return true;
            }
        };

        self.renderer.render(
            &mut self.surface,
            profile,
            &axis,
            self.project.active_cues(),
            self.playhead,
        );
        true
    }

    // Persistence

    pub fn export_json(&self) -> CueResult<String> {
        let json = self.project.to_json()?;
        tracing::info!("Exported {} page(s)", self.project.pages().len());
        Ok(json)
    }

    /// Replace the project with an imported document.
    ///
    /// On failure the current project is kept and a notice is recorded.
    pub fn import_json(&mut self, json: &str) -> CueResult<ImportOutcome> {
        let (mut project, report) = match Project::from_json(json) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Import failed: {}", e);
                self.notice = e.user_notice();
                return Err(e);
            }
        };

        let loaded_name = self.track.as_ref().map(|t| t.file_name.clone());
        let relink = project
            .audio_file_name
            .clone()
            .filter(|name| Some(name) != loaded_name.as_ref());

        if project.audio_file_name.is_none() {
            project.audio_file_name = loaded_name;
        }
        self.project = project;
        self.hovered = None;
        self.request_redraw();
        Ok(ImportOutcome { report, relink })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn config(width: u32) -> EditorConfig {
        EditorConfig {
            canvas_width: width,
            canvas_height: 20,
            ..EditorConfig::default()
        }
    }

    fn tone(duration_secs: f64, sample_rate: u32) -> DecodedAudio {
        let len = (duration_secs * sample_rate as f64) as usize;
        let samples = (0..len).map(|i| (i as f32 * 0.01).sin() * 0.8);
        let samples = samples.collect();
        DecodedAudio::new(samples, sample_rate, 1).unwrap()
    }

    /// Session 100px wide with a 10s track, so 1s == 10px
    fn loaded_session() -> Session {
        let mut session = Session::new(config(100)).unwrap();
        let ticket = session.begin_decode("take.wav").unwrap();
        let audio = tone(10.0, 1000);
        assert!(session.on_audio_decoded(ticket, Ok(audio)).unwrap());
        session
    }

    struct StubDecoder {
        fail: bool,
    }

    #[async_trait]
    impl AudioDecoder for StubDecoder {
        async fn decode(&self, _path: &Path) -> CueResult<DecodedAudio> {
            if self.fail {
                Err(CueError::decode("unsupported codec"))
            } else {
                Ok(tone(2.0, 1000))
            }
        }
    }

    struct PendingDecoder;

    #[async_trait]
    impl AudioDecoder for PendingDecoder {
        async fn decode(&self, _path: &Path) -> CueResult<DecodedAudio> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_new_session_has_default_page() {
        let session = Session::new(EditorConfig::default()).unwrap();
        assert_eq!(session.project().pages().len(), 1);
        assert_eq!(session.project().pages()[0].name, "Page 1");
        assert!(session.track().is_none());
        assert!(session.playhead().is_none());
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Session::new(config(0)).is_err());
    }

    #[test]
    fn test_stale_decode_is_discarded() {
        let mut session = Session::new(config(100)).unwrap();
        let first = session.begin_decode("a.wav").unwrap();
        let second = session.begin_decode("b.wav").unwrap();
        assert!(second.generation() > first.generation());

        let audio = tone(1.0, 1000);
        assert!(!session.on_audio_decoded(first, Ok(audio)).unwrap());
        assert!(session.track().is_none());

        let audio = tone(3.0, 1000);
        assert!(session.on_audio_decoded(second, Ok(audio)).unwrap());
        assert_eq!(session.track().unwrap().duration_secs, 3.0);
        let name = session.project().audio_file_name.as_deref();
        assert_eq!(name, Some("b.wav"));
    }

    #[test]
    fn test_same_file_decode_is_not_reentrant() {
        let mut session = Session::new(config(100)).unwrap();
        let ticket = session.begin_decode("a.wav").unwrap();
        assert!(session.begin_decode("a.wav").is_none());

        let audio = tone(1.0, 1000);
        session.on_audio_decoded(ticket, Ok(audio)).unwrap();
        assert!(session.begin_decode("a.wav").is_some());
    }

    #[test]
    fn test_failed_decode_records_notice() {
        let mut session = Session::new(config(100)).unwrap();
        let ticket = session.begin_decode("broken.wav").unwrap();
        let err = session
            .on_audio_decoded(ticket, Err(CueError::decode("bad header")))
            .unwrap_err();

        assert!(matches!(err, CueError::Decode(_)));
        assert!(session.track().is_none());
        assert!(session.take_notice().unwrap().contains("bad header"));
        assert!(session.take_notice().is_none());
    }

    #[tokio::test]
    async fn test_load_audio_with_decoder() {
        let mut session = Session::new(config(100)).unwrap();
        let loaded = session
            .load_audio(&StubDecoder { fail: false }, Path::new("/music/song.wav"))
            .await
            .unwrap();
        assert!(loaded);
        let name = session.project().audio_file_name.as_deref();
        assert_eq!(name, Some("song.wav"));

        let result = session
            .load_audio(&StubDecoder { fail: true }, Path::new("other.wav"))
            .await;
        assert!(result.is_err());
        // previous track stays loaded
        assert_eq!(session.track().unwrap().duration_secs, 2.0);
    }

    #[test]
    fn test_redraws_coalesce() {
        let mut session = loaded_session();
        assert!(session.render_frame());
        assert!(!session.render_frame());

        for i in 0..50 {
            session.on_playback_tick(i as f64 * 0.01);
        }
        assert!(session.render_frame());
        assert!(!session.render_frame());
        assert_eq!(session.profile_computations(), 1);
    }

    #[test]
    fn test_resize_recomputes_profile() {
        let mut session = loaded_session();
        session.render_frame();
        session.resize(50, 20).unwrap();
        assert!(session.render_frame());
        assert_eq!(session.surface().width(), 50);
        assert_eq!(session.profile_computations(), 2);
    }

    #[test]
    fn test_render_without_track_clears() {
        let mut session = Session::new(config(100)).unwrap();
        assert!(session.render_frame());
        assert!(session
            .surface()
            .data()
            .chunks_exact(4)
            .all(|px| px == Color::BACKGROUND.to_rgba().as_slice()));
    }

    #[test]
    fn test_tick_flashes_near_cue() {
        let mut session = loaded_session();
        session.on_pointer_click(20.0, 0.0);
        session.add_cue_at_playhead().unwrap();

        let start = Instant::now();
        let far = session.on_playback_tick_at(1.0, start);
        assert_eq!(far.timecode, "00:01.000");
        assert!(!far.flash);

        let near = session.on_playback_tick_at(2.05, start);
        assert_eq!(near.timecode, "00:02.050");
        assert!(near.flash);
        assert!(session.flash_active_at(start + Duration::from_millis(150)));
        assert!(!session.flash_active_at(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_flash_state() {
        let now = Instant::now();
        let mut flash = FlashState::new(Duration::from_millis(200));
        assert!(!flash.is_active(now));

        flash.trigger(now);
        assert!(flash.is_active(now + Duration::from_millis(199)));

        // retrigger extends
        flash.trigger(now + Duration::from_millis(100));
        assert!(flash.is_active(now + Duration::from_millis(250)));

        flash.clear();
        flash.clear();
        assert!(!flash.is_active(now));
    }

    #[test]
    fn test_tick_clamps_to_track() {
        let mut session = loaded_session();
        let outcome = session.on_playback_tick(42.0);
        assert_eq!(session.playhead(), Some(10.0));
        assert_eq!(outcome.timecode, "00:10.000");
    }

    #[test]
    fn test_hover_banner() {
        let mut session = loaded_session();
        session.on_playback_tick(5.0);
        session.add_cue_at_playhead().unwrap();

        let banner = session.on_pointer_move(52.0, 40.0).unwrap();
        assert_eq!(banner.index, 0);
        assert_eq!(banner.label, "(unnamed)");
        assert_eq!(banner.color, Color::ACCENT);
        assert_eq!(banner.y, 10.0);
        assert_eq!(session.hovered_cue(), Some(0));

        session.update_cue(0, CueField::Name, "Chorus").unwrap();
        let banner = session.on_pointer_move(50.0, 0.0).unwrap();
        assert_eq!(banner.label, "Chorus");

        assert!(session.on_pointer_move(80.0, 0.0).is_none());
        session.on_pointer_move(50.0, 0.0);
        session.on_pointer_leave();
        assert_eq!(session.hovered_cue(), None);
    }

    #[test]
    fn test_pointer_without_track() {
        let mut session = Session::new(config(100)).unwrap();
        assert!(session.on_pointer_move(10.0, 10.0).is_none());
        assert!(session.on_pointer_click(10.0, 10.0).is_none());
    }

    #[test]
    fn test_click_seeks() {
        let mut session = loaded_session();
        session.render_frame();
        assert_eq!(session.on_pointer_click(25.0, 3.0), Some(2.5));
        assert_eq!(session.playhead(), Some(2.5));
        assert!(session.redraw_pending());
    }

    #[test]
    fn test_add_cue_without_page_is_noop() {
        let mut session = loaded_session();
        session.remove_page(0).unwrap();
        session.render_frame();
        assert!(session.add_cue_at_playhead().unwrap().is_none());
        assert!(!session.redraw_pending());
    }

    #[test]
    fn test_page_switch_shows_its_cues() {
        let mut session = loaded_session();
        session.on_playback_tick(1.0);
        session.add_cue_at_playhead().unwrap();

        session.add_page(Some("Take 2"));
        assert!(session.cues().is_empty());
        session.select_page(0).unwrap();
        assert_eq!(session.cues().len(), 1);
    }

    #[test]
    fn test_import_reports_relink() {
        let mut session = loaded_session();
        let json = r#"{"pages":[{"name":"A","cues":[{"time":"00:01.000"}]}],"audioFileName":"other.wav"}"#;
        let outcome = session.import_json(json).unwrap();
        assert_eq!(outcome.relink.as_deref(), Some("other.wav"));
        assert_eq!(outcome.report.cues, 1);
        assert_eq!(session.cues()[0].position, 1.0);

        let same = r#"{"pages":[],"audioFileName":"take.wav"}"#;
        assert!(session.import_json(same).unwrap().relink.is_none());
    }

    #[test]
    fn test_failed_import_keeps_project() {
        let mut session = loaded_session();
        session.add_cue_at_playhead().unwrap();
        assert!(session.import_json("{{nope").is_err());
        assert_eq!(session.cues().len(), 1);
        assert!(session.take_notice().is_some());
    }

    #[test]
    fn test_time_edit_past_track_end_is_rejected() {
        let mut session = loaded_session();
        session.add_cue_at_playhead().unwrap();

        assert!(matches!(
            session.update_cue(0, CueField::Time, "05:00.000"),
            Err(CueError::InvalidTime(_))
        ));
        assert_eq!(session.cues()[0].position, 0.0);

        session.update_cue(0, CueField::Time, "00:10.000").unwrap();
        assert_eq!(session.cues()[0].position, 10.0);
    }

    #[test]
    fn test_time_edit_without_track_is_unbounded() {
        let mut session = Session::new(config(100)).unwrap();
        session.add_cue_at_playhead().unwrap();
        session.update_cue(0, CueField::Time, "05:00.000").unwrap();
        assert_eq!(session.cues()[0].position, 300.0);
    }

    #[tokio::test]
    async fn test_reload_after_cancelled_load() {
        let mut session = Session::new(config(100)).unwrap();
        let path = Path::new("song.wav");

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            session.load_audio(&PendingDecoder, path),
        )
        .await;
        assert!(abandoned.is_err());

        let loaded = session
            .load_audio(&StubDecoder { fail: false }, path)
            .await
            .unwrap();
        assert!(loaded);
        assert_eq!(session.track().unwrap().duration_secs, 2.0);
    }

    #[test]
    fn test_cancel_decode_allows_restart() {
        let mut session = Session::new(config(100)).unwrap();
        let first = session.begin_decode("a.wav").unwrap();
        session.cancel_decode();

        let second = session.begin_decode("a.wav").unwrap();
        let audio = tone(1.0, 1000);
        assert!(!session.on_audio_decoded(first, Ok(audio.clone())).unwrap());
        assert!(session.on_audio_decoded(second, Ok(audio)).unwrap());
    }

    #[test]
    fn test_import_without_audio_name_keeps_loaded_track() {
        let mut session = loaded_session();
        let json = r#"{"pages":[],"audioFileName":null}"#;
        let outcome = session.import_json(json).unwrap();
        assert!(outcome.relink.is_none());
        let name = session.project().audio_file_name.as_deref();
        assert_eq!(name, Some("take.wav"));

        let json = session.export_json().unwrap();
        let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(exported["audioFileName"], "take.wav");
    }
}
