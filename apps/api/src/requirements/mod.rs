//! Requirement Extractor — parses a free-text job description into an ordered,
//! weighted `RequirementSet`.
//!
//! Deterministic and explainable:
//! 1. Lines → clauses → comma parts, each classified by markers
//!    (`required` / `preferred` / `mentioned`), falling back to the current
//!    section header.
//! 2. Terms per part: lexicon skills, "N+ years" experience, and short
//!    free-form list items under an explicit marker.
//! 3. weight = base × (1 + frequency bonus + position bonus), where
//!    base is 2.0 / 1.0 / 0.5, frequency bonus = min(0.1 × (mentions − 1), 0.3)
//!    and position bonus = 0.2 × (1 − first_position / len).

pub mod markers;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::models::{Importance, Requirement, RequirementKind, RequirementSet};
use crate::skills::SkillLexicon;
use crate::text::{normalize_text, tokenize};

const FREQUENCY_STEP: f64 = 0.1;
const FREQUENCY_BONUS_CAP: f64 = 0.3;
const POSITION_BONUS: f64 = 0.2;
const MAX_PHRASE_TOKENS: usize = 3;
const MAX_PHRASE_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("job description is empty")]
    EmptyInput,
}

static CLAUSE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](?:\s|$)|;|•|·").expect("valid regex"));

static YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid regex")
});

static ITEM_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:and|or)\s+|\s*&\s*").expect("valid regex"));

/// Stripped from either end of a free-form list item.
const FILLER: &[&str] = &[
    "experience", "experienced", "with", "in", "of", "on", "knowledge", "familiarity",
    "proficiency", "proficient", "expertise", "background", "understanding", "strong", "solid",
    "excellent", "good", "great", "hands-on", "working", "deep", "skills", "skill", "a", "an",
    "the", "plus", "is", "are", "be", "preferred", "required", "require", "requires",
    "requirement", "requirements", "nice", "to", "have", "desired", "desirable", "bonus", "must",
    "mandatory", "essential", "ideally", "optional", "qualifications", "minimum", "ability",
    "able",
];

/// A free-form item containing any of these is prose, not a term.
const STOPWORDS: &[&str] = &[
    "and", "or", "for", "we", "you", "our", "your", "will", "with", "in", "of", "at", "on",
    "to", "the", "a", "an", "is", "are", "be", "as", "by", "from", "that", "this", "who",
    "what", "which", "it", "its", "us", "they", "their", "team", "role", "work", "job",
    "company", "candidate", "candidates", "looking", "join", "years", "year",
];

#[derive(Debug)]
struct Candidate {
    term: String,
    kind: RequirementKind,
    importance: Importance,
    mentions: u32,
    first_position: usize,
}

/// Accumulates term mentions across the whole description. Keyed so that
/// iteration order is deterministic.
#[derive(Default)]
struct Collector {
    candidates: BTreeMap<String, Candidate>,
}

impl Collector {
    fn record(
        &mut self,
        key: String,
        term: String,
        kind: RequirementKind,
        importance: Importance,
        position: usize,
    ) {
        self.candidates
            .entry(key)
            .and_modify(|c| {
                c.mentions += 1;
                c.importance = c.importance.strongest(importance);
                c.first_position = c.first_position.min(position);
            })
            .or_insert(Candidate {
                term,
                kind,
                importance,
                mentions: 1,
                first_position: position,
            });
    }

    fn finish(self, text_len: usize) -> RequirementSet {
        let requirements = self
            .candidates
            .into_values()
            .map(|c| Requirement {
                weight: compute_weight(c.importance, c.mentions, c.first_position, text_len),
                mandatory: c.importance.is_mandatory(),
                term: c.term,
                kind: c.kind,
                importance: c.importance,
                mentions: c.mentions,
                first_position: c.first_position,
            })
            .collect();
        RequirementSet::from_requirements(requirements)
    }
}

/// Parses job-description text into a `RequirementSet`.
pub fn extract_requirements(
    jd_text: &str,
    lexicon: &SkillLexicon,
) -> Result<RequirementSet, ExtractError> {
    if jd_text.trim().is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let text = normalize_text(jd_text);
    let mut collector = Collector::default();
    let mut section = Importance::Mentioned;
    let mut line_offset = 0;

    for line in text.split('\n') {
        if let Some(header) = markers::section_header(line) {
            section = header;
        } else {
            for (clause_offset, clause) in clauses(line) {
                collect_clause(
                    &mut collector,
                    lexicon,
                    clause,
                    line_offset + clause_offset,
                    section,
                );
            }
        }
        line_offset += line.len() + 1;
    }

    let set = collector.finish(text.len());
    debug!(
        "Extracted {} requirements ({} mandatory) from {} chars of JD text",
        set.len(),
        set.mandatory().count(),
        text.len()
    );
    Ok(set)
}

fn collect_clause(
    collector: &mut Collector,
    lexicon: &SkillLexicon,
    clause: &str,
    clause_offset: usize,
    section: Importance,
) {
    let mut current = section;

    for (part_offset, part) in comma_parts(clause) {
        let (body, body_offset) = match markers::leading_label(part) {
            Some((importance, rest)) => {
                current = importance;
                (&part[rest..], part_offset + rest)
            }
            None => (part, part_offset),
        };

        let importance = match markers::opening_marker(body) {
            Some(opening) => {
                current = opening;
                opening
            }
            None => markers::inline_marker(body).unwrap_or(current),
        };
        let position = clause_offset + body_offset;
        let mut found_term = false;

        let tokens = tokenize(body);
        for hit in lexicon.detect(&tokens) {
            found_term = true;
            collector.record(
                format!("skill:{}", hit.canonical),
                hit.canonical,
                RequirementKind::Skill,
                importance,
                position + hit.offset,
            );
        }

        if importance != Importance::Mentioned {
            for caps in YEARS.captures_iter(body) {
                let Some(years) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                    continue;
                };
                found_term = true;
                collector.record(
                    format!("experience:{years:02}"),
                    format!("{years}+ years experience"),
                    RequirementKind::Experience { min_years: years },
                    importance,
                    position + caps.get(0).map_or(0, |m| m.start()),
                );
            }

            if !found_term {
                for phrase in free_form_terms(body) {
                    collector.record(
                        format!("phrase:{phrase}"),
                        phrase,
                        RequirementKind::Phrase,
                        importance,
                        position,
                    );
                }
            }
        }
    }
}

/// Splits a line into clauses at sentence ends (not inside "node.js"),
/// semicolons, and bullets.
fn clauses(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in CLAUSE_BREAK.find_iter(line) {
        push_non_blank(&mut out, line, start, m.start());
        start = m.end();
    }
    push_non_blank(&mut out, line, start, line.len());
    out
}

fn comma_parts(clause: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, _) in clause.match_indices(',') {
        push_non_blank(&mut out, clause, start, idx);
        start = idx + 1;
    }
    push_non_blank(&mut out, clause, start, clause.len());
    out
}

fn push_non_blank<'a>(out: &mut Vec<(usize, &'a str)>, source: &'a str, start: usize, end: usize) {
    let piece = &source[start..end];
    if !piece.trim().is_empty() {
        out.push((start, piece));
    }
}

/// Short list items such as "Storybook" or "communication" that aren't in
/// the lexicon. Returned as token-joined lowercase phrases.
fn free_form_terms(body: &str) -> Vec<String> {
    ITEM_SPLIT
        .split(body)
        .filter_map(|item| {
            let tokens = tokenize(item);
            let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
            let start = words.iter().position(|w| !FILLER.contains(w))?;
            let end = words.iter().rposition(|w| !FILLER.contains(w))? + 1;
            let core = &words[start..end];

            let plausible = core.len() <= MAX_PHRASE_TOKENS
                && core
                    .iter()
                    .all(|w| w.chars().any(char::is_alphabetic) && !STOPWORDS.contains(w));
            let phrase = core.join(" ");
            (plausible && phrase.len() <= MAX_PHRASE_CHARS).then_some(phrase)
        })
        .collect()
}

fn compute_weight(importance: Importance, mentions: u32, first_position: usize, text_len: usize) -> f64 {
    let frequency_bonus =
        (FREQUENCY_STEP * f64::from(mentions.saturating_sub(1))).min(FREQUENCY_BONUS_CAP);
    let relative_position = first_position as f64 / text_len.max(1) as f64;
    let position_bonus = POSITION_BONUS * (1.0 - relative_position).clamp(0.0, 1.0);
    let weight = importance.base_weight() * (1.0 + frequency_bonus + position_bonus);
    (weight * 1000.0).round() / 1000.0
}
