//! Matcher — pluggable, trait-based scorer that measures one document against
//! a requirement set.
//!
//! Default: `KeywordScorer` (pure, deterministic, no I/O).
//!
//! Algorithm:
//! 1. For each requirement:
//!    - skill → matched if the document's detected skills contain the
//!      canonical term (`exact` when spelled canonically, else `synonym`)
//!    - phrase → matched if the phrase occurs as contiguous tokens
//!    - experience → matched if years of experience ≥ the minimum
//! 2. score = Σ(matched weight) / Σ(weight) × 100, one decimal
//! 3. any unmet mandatory requirement caps the score at `MANDATORY_SCORE_CAP`

use crate::models::{
    Document, MatchKind, MatchResult, MatchedTerm, Requirement, RequirementKind, RequirementSet,
};
use crate::text::{find_phrase, tokenize};

/// Ceiling applied when any mandatory requirement is unmet.
pub const MANDATORY_SCORE_CAP: f64 = 50.0;

/// The scorer trait. Implement this to swap backends without touching the
/// pipeline or handlers. Implementations must be pure: identical inputs give
/// identical results.
pub trait Scorer: Send + Sync {
    fn backend(&self) -> &'static str;

    fn score(&self, document: &Document, requirements: &RequirementSet) -> MatchResult;
}

pub struct KeywordScorer;

impl Scorer for KeywordScorer {
    fn backend(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, document: &Document, requirements: &RequirementSet) -> MatchResult {
        score_document(document, requirements)
    }
}

pub fn score_document(document: &Document, requirements: &RequirementSet) -> MatchResult {
    // Matched weights accumulate in requirement order, the same order
    // `total_weight` sums in, so full coverage divides to exactly 100.
    let total_weight = requirements.total_weight();
    let mut matched_weight = 0.0;
    let mut hits: Vec<(&Requirement, MatchKind, String)> = Vec::new();
    let mut unmet_mandatory = Vec::new();
    let mut skills_to_improve = Vec::new();

    for requirement in requirements.requirements() {
        match match_requirement(document, requirement) {
            Some((kind, evidence)) => {
                matched_weight += requirement.weight;
                hits.push((requirement, kind, evidence));
            }
            None if requirement.mandatory => unmet_mandatory.push(requirement.term.clone()),
            None => skills_to_improve.push(requirement.term.clone()),
        }
    }

    let matched_terms = hits
        .into_iter()
        .map(|(requirement, kind, evidence)| MatchedTerm {
            term: requirement.term.clone(),
            kind,
            contribution: percent(requirement.weight, total_weight),
            evidence,
        })
        .collect();

    let raw_score = percent(matched_weight, total_weight);
    let capped = !unmet_mandatory.is_empty() && raw_score > MANDATORY_SCORE_CAP;
    let score = if capped { MANDATORY_SCORE_CAP } else { raw_score };

    let recommendation = build_recommendation(score, &unmet_mandatory, &skills_to_improve);

    MatchResult {
        document_id: document.id,
        filename: document.filename.clone(),
        score,
        capped,
        matched_terms,
        unmet_mandatory,
        skills_to_improve,
        recommendation,
    }
}

/// Returns the match kind and the evidence found, or `None` when the
/// document doesn't satisfy the requirement.
fn match_requirement(document: &Document, requirement: &Requirement) -> Option<(MatchKind, String)> {
    match &requirement.kind {
        RequirementKind::Skill => {
            let skill = document.skill(&requirement.term)?;
            if skill.mentioned_verbatim() {
                Some((MatchKind::Exact, skill.name.clone()))
            } else {
                let surface = skill.surfaces.first()?.clone();
                Some((MatchKind::Synonym, surface))
            }
        }
        RequirementKind::Phrase => {
            let needle: Vec<String> = tokenize(&requirement.term)
                .into_iter()
                .map(|t| t.text)
                .collect();
            find_phrase(&document.tokens, &needle)
                .map(|_| (MatchKind::Exact, requirement.term.clone()))
        }
        RequirementKind::Experience { min_years } => {
            let years = document.years_of_experience?;
            (years >= *min_years)
                .then(|| (MatchKind::Experience, format!("{years} years of experience")))
        }
    }
}

/// Sorts results into ranking order (score descending, fewer unmet mandatory
/// requirements, then document identifier).
pub fn rank_results(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| a.rank_cmp(b));
    results
}

fn percent(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    ((part / total) * 1000.0).round() / 10.0
}

/// Builds a human-readable recommendation from score and gaps.
fn build_recommendation(score: f64, unmet_mandatory: &[String], skills_to_improve: &[String]) -> String {
    if !unmet_mandatory.is_empty() {
        return format!(
            "Missing mandatory requirements: {} ({score}/100). Not a fit until these are covered.",
            unmet_mandatory.join(", ")
        );
    }

    let top_gaps: Vec<&str> = skills_to_improve.iter().take(3).map(String::as_str).collect();

    if score >= 80.0 {
        "Strong fit. The resume covers the key requirements.".to_string()
    } else if score >= 60.0 {
        format!(
            "Moderate fit ({score}/100). Worth probing: {}.",
            top_gaps.join(", ")
        )
    } else if top_gaps.is_empty() {
        format!("Low fit ({score}/100).")
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        )
    }
}
