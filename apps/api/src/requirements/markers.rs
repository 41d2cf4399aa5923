//! Linguistic markers that classify job-description text as required,
//! preferred, or merely mentioned.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Importance;

static PREFERRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:nice[\s-]to[\s-]haves?|preferred|preferably|a plus|bonus|desirable|desired|ideally|optional)\b",
    )
    .expect("valid regex")
});

static REQUIRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:required|requires|require|requirements?|must[\s-]haves?|must|mandatory|essential|qualifications|minimum)\b",
    )
    .expect("valid regex")
});

static NEUTRAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:responsibilities|about|benefits|perks|what you(?:'|’)?ll do|who we are|the role|overview|description)\b",
    )
    .expect("valid regex")
});

/// "Required: ...", "- Nice to have: ...". Captures the label before the colon.
static LEADING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•#]+\s*)?([^:]{1,40}):").expect("valid regex"));

/// Words that may make up a header line without a trailing colon.
const HEADER_WORDS: &[&str] = &[
    "requirements", "requirement", "required", "qualifications", "qualification", "minimum",
    "basic", "preferred", "nice", "to", "have", "haves", "nice-to-have", "nice-to-haves",
    "bonus", "points", "must", "must-have", "must-haves", "skills", "what", "you", "you'll",
    "bring", "responsibilities", "about", "us", "the", "role", "benefits", "perks", "who",
    "we", "are", "overview", "key", "your", "job", "description", "desired", "desirable",
    "additional", "plus", "optional", "essential", "mandatory", "experience", "and",
];

const HEADER_MAX_WORDS: usize = 6;

/// Classifies a label such as "Nice to have" or "About us".
pub fn classify_label(label: &str) -> Option<Importance> {
    if PREFERRED.is_match(label) {
        Some(Importance::Preferred)
    } else if REQUIRED.is_match(label) {
        Some(Importance::Required)
    } else if NEUTRAL.is_match(label) {
        Some(Importance::Mentioned)
    } else {
        None
    }
}

/// Marker inside running text ("Rust required", "Kafka a plus"). Neutral
/// headers don't count here.
pub fn inline_marker(text: &str) -> Option<Importance> {
    if PREFERRED.is_match(text) {
        Some(Importance::Preferred)
    } else if REQUIRED.is_match(text) {
        Some(Importance::Required)
    } else {
        None
    }
}

/// Marker that opens a list without a colon ("Must have React, Node.js",
/// "Nice to have Kafka, Redis"). Governs the rest of the clause.
pub fn opening_marker(part: &str) -> Option<Importance> {
    let head = part.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '#') || c.is_whitespace());
    let opens = |marker: &Regex| marker.find(head).is_some_and(|m| m.start() == 0);
    if opens(&PREFERRED) {
        Some(Importance::Preferred)
    } else if opens(&REQUIRED) {
        Some(Importance::Required)
    } else {
        None
    }
}

/// A recognized `label:` at the start of `part`. Returns the classification
/// and the byte index just past the colon.
pub fn leading_label(part: &str) -> Option<(Importance, usize)> {
    let caps = LEADING_LABEL.captures(part)?;
    let importance = classify_label(caps.get(1)?.as_str())?;
    Some((importance, caps.get(0)?.end()))
}

/// A line that is nothing but a section header, e.g. `Requirements:`,
/// `## Nice to have`, or `Preferred Qualifications`.
pub fn section_header(line: &str) -> Option<Importance> {
    let trimmed = line.trim();
    let is_markdown = trimmed.starts_with('#');
    let stripped = trimmed
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '-' | '•') || c.is_whitespace())
        .trim_end_matches(|c: char| c == '*' || c.is_whitespace());
    let (label, had_colon) = match stripped.strip_suffix(':') {
        Some(label) => (label.trim(), true),
        None => (stripped, false),
    };
    if label.is_empty() || label.contains(':') {
        return None;
    }

    let words: Vec<String> = label
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
                .to_lowercase()
        })
        .collect();
    if words.len() > HEADER_MAX_WORDS {
        return None;
    }

    if had_colon || is_markdown || words.iter().all(|w| HEADER_WORDS.contains(&w.as_str())) {
        classify_label(label)
    } else {
        None
    }
}
