use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::document::DocumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The requirement's own spelling appears in the document.
    Exact,
    /// Matched through a lexicon alias.
    Synonym,
    /// Years of experience meet the stated minimum.
    Experience,
}

/// One satisfied requirement and what it contributed to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTerm {
    pub term: String,
    pub kind: MatchKind,
    /// Score points (0–100 scale) this term contributes.
    pub contribution: f64,
    /// What was found in the document.
    pub evidence: String,
}

/// Per-document score and explanation against one requirement set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub document_id: DocumentId,
    pub filename: String,
    /// 0.0 – 100.0, one decimal.
    pub score: f64,
    /// True when an unmet mandatory requirement pulled the score down to the cap.
    pub capped: bool,
    pub matched_terms: Vec<MatchedTerm>,
    pub unmet_mandatory: Vec<String>,
    /// Unmet non-mandatory terms, strongest first.
    pub skills_to_improve: Vec<String>,
    pub recommendation: String,
}

impl MatchResult {
    /// Ranking order: score descending, then fewer unmet mandatory
    /// requirements, then document identifier.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.unmet_mandatory.len().cmp(&other.unmet_mandatory.len()))
            .then_with(|| self.document_id.cmp(&other.document_id))
    }
}
