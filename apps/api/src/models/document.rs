use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::Token;

/// Stable document identifier. Derived from upload position, filename and
/// content, so the same batch always produces the same identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn derive(position: usize, filename: &str, content: &[u8]) -> Self {
        let mut seed = Vec::with_capacity(8 + filename.len() + 1 + content.len());
        seed.extend_from_slice(&(position as u64).to_be_bytes());
        seed.extend_from_slice(filename.as_bytes());
        seed.push(0);
        seed.extend_from_slice(content);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, &seed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

/// A canonical skill found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedSkill {
    pub name: String,
    /// Distinct surface forms, in order of first appearance.
    pub surfaces: Vec<String>,
    pub occurrences: u32,
}

impl DetectedSkill {
    /// True when the canonical spelling itself appears in the document.
    pub fn mentioned_verbatim(&self) -> bool {
        self.surfaces.iter().any(|s| *s == self.name)
    }
}

/// Normalized representation of one uploaded resume. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: DocumentId,
    /// Place in the upload batch, zero-based.
    pub position: usize,
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    /// Ordered by first appearance in the text.
    pub skills: Vec<DetectedSkill>,
    pub years_of_experience: Option<u32>,
    pub title: Option<String>,
    #[serde(skip)]
    pub tokens: Vec<Token>,
}

impl Document {
    pub fn skill(&self, name: &str) -> Option<&DetectedSkill> {
        self.skills.iter().find(|s| s.name == name)
    }
}
