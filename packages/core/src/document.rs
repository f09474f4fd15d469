//! JSON export/import of cue documents
//!
//! Export always writes the current shape. Import is lenient: missing
//! `pages`/`cues` read as empty, missing strings as defaults, and the older
//! bare-array-of-pages format (with per-cue `position` floats) is accepted.

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::Color;
use crate::error::{CueError, CueResult};
use crate::project::{Cue, Page, Project};
use crate::timecode::timecode_to_seconds;

/// Top-level persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: Vec<PageRecord>,
    #[serde(rename = "audioFileName", default)]
    pub audio_file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cues: Vec<CueRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueRecord {
    /// `MM:SS.mmm`
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// Older exports stored seconds alongside `time`; only read, never written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

/// What an import kept and what it had to drop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub pages: usize,
    pub cues: usize,
    /// Cues with neither a valid `time` nor a valid `position`
    pub skipped_cues: usize,
    /// The document was a bare array of pages
    pub legacy_format: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Current(CueDocument),
    Legacy(Vec<PageRecord>),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CueDocument {
    pub fn from_project(project: &Project) -> CueResult<Self> {
        let pages = project
            .pages()
            .iter()
            .map(|page| {
                let cues = page
                    .cues
                    .iter()
                    .map(|cue| {
                        Ok(CueRecord {
                            time: cue.time()?,
                            name: cue.name.clone(),
                            note: cue.note.clone(),
                            color: cue.color.to_hex(),
                            position: None,
                        })
                    })
                    .collect::<CueResult<Vec<_>>>()?;

                Ok(PageRecord {
                    name: page.name.clone(),
                    color: page.color.to_hex(),
                    cues,
                })
            })
            .collect::<CueResult<Vec<_>>>()?;

        Ok(Self {
            pages,
            audio_file_name: project.audio_file_name.clone(),
        })
    }

    /// Parse either document shape; anything else is a malformed document.
    /// The flag is set for the legacy bare-array shape.
    fn parse_raw(json: &str) -> CueResult<(Self, bool)> {
        let raw: RawDocument =
            serde_json::from_str(json).map_err(|e| CueError::malformed(e.to_string()))?;

        Ok(match raw {
            RawDocument::Current(document) => (document, false),
            RawDocument::Legacy(pages) => (
                Self {
                    pages,
                    audio_file_name: None,
                },
                true,
            ),
        })
    }

    pub fn into_project(self) -> CueResult<(Project, ImportReport)> {
        let mut report = ImportReport::default();
        let mut pages = Vec::with_capacity(self.pages.len());

        for (page_index, record) in self.pages.into_iter().enumerate() {
            let name = if record.name.trim().is_empty() {
                format!("Page {}", page_index + 1)
            } else {
                record.name
            };
            let color = parse_color_or(&record.color, Color::PAGE, &name);

            let mut page = Page::new(name);
            page.color = color;

            for cue_record in record.cues {
                match record_position(&cue_record) {
                    Some(position) => {
                        let mut cue = Cue::new(position);
                        cue.color = parse_color_or(&cue_record.color, Color::ACCENT, &page.name);
                        cue.name = cue_record.name;
                        cue.note = cue_record.note;
                        page.cues.push(cue);
                        report.cues += 1;
                    }
                    None => {
                        tracing::warn!(
                            "Skipping cue '{}' on page '{}': no usable time (time={:?}, position={:?})",
                            cue_record.name,
                            page.name,
                            cue_record.time,
                            cue_record.position
                        );
                        report.skipped_cues += 1;
                    }
                }
            }

            pages.push(page);
        }

        report.pages = pages.len();
        Ok((Project::from_parts(pages, self.audio_file_name), report))
    }
}

/// Parse a document in either shape into a project.
///
/// The first page (if any) becomes active.
pub fn import(json: &str) -> CueResult<(Project, ImportReport)> {
    let (document, legacy) = CueDocument::parse_raw(json)?;
    let (project, mut report) = document.into_project()?;
    report.legacy_format = legacy;
    tracing::info!(
        pages = report.pages,
        cues = report.cues,
        skipped = report.skipped_cues,
        legacy,
        "Imported cue document"
    );
    Ok((project, report))
}

fn record_position(record: &CueRecord) -> Option<f64> {
    timecode_to_seconds(&record.time)
        .ok()
        .or(record.position)
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn parse_color_or(hex: &str, fallback: Color, context: &str) -> Color {
    if hex.trim().is_empty() {
        return fallback;
    }
    Color::from_hex(hex).unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid color {:?} in '{}', using {}",
            hex,
            context,
            fallback
        );
        fallback
    })
}
