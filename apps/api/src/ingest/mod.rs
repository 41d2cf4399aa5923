//! Document Ingestor — turns one uploaded file into a normalized `Document`.
//!
//! Pure with respect to the outside world: no filesystem writes, no clock
//! reads (the reference year for "Present" comes in through `IngestOptions`).

pub mod format;
pub mod signals;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::{DetectedSkill, Document, DocumentId};
use crate::skills::SkillLexicon;
use crate::text::{normalize_text, tokenize, Token};

/// An uploaded file as received from the presentation layer.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub max_file_bytes: usize,
    /// Year that open ranges ("2021 – Present") end at.
    pub reference_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("file is {actual} bytes, limit is {limit} bytes")]
    SizeLimitExceeded { limit: usize, actual: usize },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("could not parse file: {0}")]
    Parse(String),
}

impl IngestError {
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::SizeLimitExceeded { .. } => "SIZE_LIMIT_EXCEEDED",
            IngestError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            IngestError::Parse(_) => "PARSE_ERROR",
        }
    }
}

/// Ingests one file. `position` is the file's place in the upload batch and
/// feeds the document identifier.
pub fn ingest_document(
    position: usize,
    file: &RawFile,
    lexicon: &SkillLexicon,
    options: &IngestOptions,
) -> Result<Document, IngestError> {
    if file.bytes.len() > options.max_file_bytes {
        return Err(IngestError::SizeLimitExceeded {
            limit: options.max_file_bytes,
            actual: file.bytes.len(),
        });
    }

    let format = format::detect_format(
        &file.filename,
        file.content_type.as_deref(),
        &file.bytes,
    )?;
    let raw_text = format::extract_text(format, &file.bytes)?;
    let text = normalize_text(&raw_text);
    if text.is_empty() {
        return Err(IngestError::Parse("no extractable text".to_string()));
    }

    let tokens = tokenize(&text);
    let skills = collect_skills(lexicon, &tokens);
    let years_of_experience = signals::detect_years_of_experience(&text, options.reference_year);
    let title = signals::detect_title(&text);

    debug!(
        "Ingested '{}' ({:?}): {} tokens, {} skills, years={:?}",
        file.filename,
        format,
        tokens.len(),
        skills.len(),
        years_of_experience
    );

    Ok(Document {
        id: DocumentId::derive(position, &file.filename, &file.bytes),
        position,
        filename: file.filename.clone(),
        format,
        text,
        skills,
        years_of_experience,
        title,
        tokens,
    })
}

/// Groups lexicon hits by canonical skill, keeping first-appearance order.
fn collect_skills(lexicon: &SkillLexicon, tokens: &[Token]) -> Vec<DetectedSkill> {
    let mut skills: Vec<DetectedSkill> = Vec::new();
    for hit in lexicon.detect(tokens) {
        match skills.iter_mut().find(|s| s.name == hit.canonical) {
            Some(existing) => {
                existing.occurrences += 1;
                if !existing.surfaces.contains(&hit.surface) {
                    existing.surfaces.push(hit.surface);
                }
            }
            None => skills.push(DetectedSkill {
                name: hit.canonical,
                surfaces: vec![hit.surface],
                occurrences: 1,
            }),
        }
    }
    skills
}
