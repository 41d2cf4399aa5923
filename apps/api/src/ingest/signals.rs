//! Structural signals read from normalized resume text: years of experience
//! and the candidate's title.

use std::sync::LazyLock;

use regex::Regex;

const MAX_PLAUSIBLE_YEARS: u32 = 50;
const EARLIEST_CAREER_YEAR: i32 = 1950;
const TITLE_SCAN_LINES: usize = 10;
const TITLE_MAX_WORDS: usize = 8;

const ROLE_NOUNS: &[&str] = &[
    "engineer",
    "developer",
    "programmer",
    "designer",
    "architect",
    "scientist",
    "analyst",
    "manager",
    "consultant",
    "administrator",
    "specialist",
    "lead",
    "director",
    "intern",
    "devops",
    "sre",
    "recruiter",
];

/// "8 years of experience", "5+ yrs professional experience".
static YEARS_BEFORE_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b(?:\s+of)?(?:\s+[\w.+#/-]+){0,3}?\s+experience")
        .expect("valid regex")
});

/// "Experience: 7 years".
static EXPERIENCE_BEFORE_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bexperience\b[^\d\n]{0,20}?(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b")
        .expect("valid regex")
});

/// "2016 – 2020", "Jan 2021 - Present", "03/2018 to 11/2019".
static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:19|20)\d{2})\s*(?:-|–|—|to|until)\s*(?:[a-z]{3,9}\.?\s+|\d{1,2}/)?((?:19|20)\d{2}|present|current|now|today)\b",
    )
    .expect("valid regex")
});

static TITLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:title|current role|role|position)\s*:\s*").expect("valid regex")
});

/// Largest of the explicitly stated experience and the merged span of the
/// year ranges. Open ranges end at `reference_year`.
pub fn detect_years_of_experience(text: &str, reference_year: i32) -> Option<u32> {
    let explicit = YEARS_BEFORE_EXPERIENCE
        .captures_iter(text)
        .chain(EXPERIENCE_BEFORE_YEARS.captures_iter(text))
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|&y| y <= MAX_PLAUSIBLE_YEARS)
        .max();

    let from_ranges = employment_span_years(text, reference_year);

    match (explicit, from_ranges) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn employment_span_years(text: &str, reference_year: i32) -> Option<u32> {
    let mut ranges: Vec<(i32, i32)> = YEAR_RANGE
        .captures_iter(text)
        .filter_map(|c| {
            let start: i32 = c.get(1)?.as_str().parse().ok()?;
            let end_raw = c.get(2)?.as_str();
            let end = end_raw.parse::<i32>().unwrap_or(reference_year);
            Some((start, end.min(reference_year)))
        })
        .filter(|&(start, end)| start >= EARLIEST_CAREER_YEAR && start <= end)
        .collect();

    if ranges.is_empty() {
        return None;
    }

    ranges.sort_unstable();
    let mut merged: Vec<(i32, i32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let total: i32 = merged.iter().map(|(s, e)| e - s).sum();
    u32::try_from(total)
        .ok()
        .map(|t| t.min(MAX_PLAUSIBLE_YEARS))
}

/// First short line near the top that names a role.
pub fn detect_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(TITLE_SCAN_LINES)
        .map(|l| TITLE_LABEL.replace(l, "").trim().to_string())
        .find(|line| {
            let words: Vec<String> = line
                .split_whitespace()
                .map(|w| {
                    w.trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase()
                })
                .collect();
            !words.is_empty()
                && words.len() <= TITLE_MAX_WORDS
                && !line.contains('@')
                && words.iter().any(|w| ROLE_NOUNS.contains(&w.as_str()))
        })
}
