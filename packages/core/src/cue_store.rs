//! Index-based cue editing on the active page
//!
//! Indices always refer to storage order, which is the order the cue table
//! displays. Obtain a fresh store for every event instead of holding indices
//! across mutations.

use crate::color::Color;
use crate::error::{CueError, CueResult};
use crate::project::{Cue, Page};
use crate::timecode::timecode_to_seconds;

/// Editable field of a cue, as addressed by the cue table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueField {
    Name,
    Note,
    Color,
    /// `MM:SS.mmm`; parsed back into the cue position
    Time,
}

/// Mutable view over the cues of the active page (if any)
#[derive(Debug)]
pub struct CueStore<'a> {
    page: Option<&'a mut Page>,
}

impl<'a> CueStore<'a> {
    pub(crate) fn new(page: Option<&'a mut Page>) -> Self {
        Self { page }
    }

    pub fn has_page(&self) -> bool {
        self.page.is_some()
    }

    /// Append a default cue at `position`.
    ///
    /// Returns `Ok(None)` when no page is active; that is an idle UI state,
    /// not an error.
    pub fn add(&mut self, position: f64) -> CueResult<Option<Cue>> {
        let Some(page) = self.page.as_deref_mut() else {
            tracing::debug!("No active page, ignoring add cue at {}", position);
            return Ok(None);
        };

        if !position.is_finite() || position < 0.0 {
            return Err(CueError::invalid_time(format!(
                "cue position {} must be a non-negative number of seconds",
                position
            )));
        }

        let cue = Cue::new(position);
        page.cues.push(cue.clone());
        Ok(Some(cue))
    }

    /// Set one field of the cue at `index`.
    pub fn update(&mut self, index: usize, field: CueField, value: &str) -> CueResult<()> {
        let cue = self.cue_mut(index)?;

        match field {
            CueField::Name => cue.name = value.to_string(),
            CueField::Note => cue.note = value.to_string(),
            CueField::Color => cue.color = Color::from_hex(value)?,
            CueField::Time => cue.position = timecode_to_seconds(value)?,
        }

        Ok(())
    }

    /// Delete the cue at `index`, keeping the order of the others.
    pub fn remove(&mut self, index: usize) -> CueResult<Cue> {
        self.check_index(index)?;
        match self.page.as_deref_mut() {
            Some(page) => Ok(page.cues.remove(index)),
            None => Err(CueError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// All cues in storage (insertion) order
    pub fn all(&self) -> &[Cue] {
        match self.page.as_deref() {
            Some(page) => page.cues.as_slice(),
            None => &[],
        }
    }

    /// Cues ordered by position, paired with their storage index.
    /// Equal positions keep storage order.
    pub fn sorted_by_time(&self) -> Vec<(usize, &Cue)> {
        let mut cues: Vec<(usize, &Cue)> = self.all().iter().enumerate().collect();
        cues.sort_by(|a, b| a.1.position.total_cmp(&b.1.position));
        cues
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.all().get(index)
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    fn check_index(&self, index: usize) -> CueResult<()> {
        let len = self.len();
        if index >= len {
            return Err(CueError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn cue_mut(&mut self, index: usize) -> CueResult<&mut Cue> {
        self.check_index(index)?;
        match self.page.as_deref_mut() {
            Some(page) => Ok(&mut page.cues[index]),
            None => Err(CueError::IndexOutOfRange { index, len: 0 }),
        }
    }
}
