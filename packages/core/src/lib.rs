pub mod axis;
pub mod color;
pub mod config;
pub mod cue_store;
pub mod decode;
pub mod document;
pub mod error;
pub mod locator;
pub mod project;
pub mod render;
pub mod session;
pub mod timecode;
pub mod waveform;

pub use axis::TimeAxis;
pub use color::Color;
pub use config::{EditorConfig, Palette};
pub use cue_store::{CueField, CueStore};
pub use decode::{AudioDecoder, DecodedAudio, WavDecoder};
pub use document::{CueDocument, ImportReport};
pub use error::{CueError, CueResult};
pub use project::{Cue, Page, Project};
pub use render::{RenderStyle, Surface, WaveformRenderer};
pub use session::{DecodeTicket, FlashState, HoverBanner, ImportOutcome, Session, TickOutcome};
pub use timecode::{seconds_to_timecode, timecode_to_seconds};
pub use waveform::{AmplitudeBin, ProfileCache, WaveformProfile};
