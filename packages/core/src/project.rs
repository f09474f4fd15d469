use std::path::Path;

use crate::color::Color;
use crate::cue_store::CueStore;
use crate::document::{self, CueDocument, ImportReport};
use crate::error::{CueError, CueResult};
use crate::timecode::seconds_to_timecode;

/// Label shown for cues without a name
pub const UNNAMED_CUE: &str = "(unnamed)";

/// One annotated instant on the track
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Seconds from the start of the track; the only stored time
    pub position: f64,
    pub name: String,
    pub note: String,
    pub color: Color,
}

impl Cue {
    pub fn new(position: f64) -> Self {
        Self {
            position,
            name: String::new(),
            note: String::new(),
            color: Color::ACCENT,
        }
    }

    /// `MM:SS.mmm`, derived from `position`
    pub fn time(&self) -> CueResult<String> {
        seconds_to_timecode(self.position)
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED_CUE
        } else {
            &self.name
        }
    }
}

/// A named collection of cues (a take or version of the annotations)
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub name: String,
    pub color: Color,
    /// Insertion order; sort explicitly when time order is needed
    pub cues: Vec<Cue>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::PAGE,
            cues: Vec::new(),
        }
    }
}

/// The persisted unit: pages plus the name of the audio file they annotate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pages: Vec<Page>,
    active_page: Option<usize>,
    /// Audio bytes are never stored, only the name for a re-link prompt
    pub audio_file_name: Option<String>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project with a single "Page 1", the state of a fresh session
    pub fn with_default_page() -> Self {
        let mut project = Self::new();
        project.add_page(None);
        project
    }

    pub(crate) fn from_parts(pages: Vec<Page>, audio_file_name: Option<String>) -> Self {
        let active_page = if pages.is_empty() { None } else { Some(0) };
        Self {
            pages,
            active_page,
            audio_file_name,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn active_page_index(&self) -> Option<usize> {
        self.active_page
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.active_page.and_then(|i| self.pages.get(i))
    }

    pub fn active_page_mut(&mut self) -> Option<&mut Page> {
        self.active_page.and_then(|i| self.pages.get_mut(i))
    }

    /// Cue operations on the active page
    pub fn cue_store(&mut self) -> CueStore<'_> {
        CueStore::new(self.active_page_mut())
    }

    /// Cues of the active page, empty when no page is active
    pub fn active_cues(&self) -> &[Cue] {
        self.active_page().map(|p| p.cues.as_slice()).unwrap_or(&[])
    }

    /// Append a page and make it active. A missing or blank name becomes
    /// "Page N".
    pub fn add_page(&mut self, name: Option<&str>) -> usize {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Page {}", self.pages.len() + 1),
        };
        self.pages.push(Page::new(name));
        let index = self.pages.len() - 1;
        self.active_page = Some(index);
        index
    }

    /// Remove a page; the active index moves to the nearest remaining page.
    pub fn remove_page(&mut self, index: usize) -> CueResult<Page> {
        self.check_page_index(index)?;
        let page = self.pages.remove(index);

        self.active_page = if self.pages.is_empty() {
            None
        } else {
            let last = self.pages.len() - 1;
            self.active_page.map(|active| active.min(last))
        };

        Ok(page)
    }

    /// Rename a page; a blank name keeps the current one.
    pub fn rename_page(&mut self, index: usize, name: &str) -> CueResult<()> {
        self.check_page_index(index)?;
        let name = name.trim();
        if !name.is_empty() {
            self.pages[index].name = name.to_string();
        }
        Ok(())
    }

    pub fn set_page_color(&mut self, index: usize, hex: &str) -> CueResult<()> {
        self.check_page_index(index)?;
        self.pages[index].color = Color::from_hex(hex)?;
        Ok(())
    }

    pub fn select_page(&mut self, index: usize) -> CueResult<()> {
        self.check_page_index(index)?;
        self.active_page = Some(index);
        Ok(())
    }

    fn check_page_index(&self, index: usize) -> CueResult<()> {
        if index >= self.pages.len() {
            return Err(CueError::IndexOutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        Ok(())
    }

    /// Serialize to the export document
    pub fn to_json(&self) -> CueResult<String> {
        let document = CueDocument::from_project(self)?;
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Parse an exported (or hand-edited) document
    pub fn from_json(json: &str) -> CueResult<(Self, ImportReport)> {
        document::import(json)
    }

    pub fn save_to_file(&self, path: &Path) -> CueResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::info!("Saved {} page(s) to {:?}", self.pages.len(), path);
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> CueResult<(Self, ImportReport)> {
        let json = std::fs::read_to_string(path)?;
        let loaded = Self::from_json(&json)?;
        tracing::info!("Loaded {} page(s) from {:?}", loaded.0.pages.len(), path);
        Ok(loaded)
    }
}
