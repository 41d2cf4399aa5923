//! Skill lexicon — canonical skill names plus synonym lists.
//!
//! Both the document ingestor and the requirement extractor detect skills
//! through the same lexicon, so a resume saying "ReactJS" and a job description
//! saying "React" resolve to the same canonical term.

mod builtin;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::text::{phrase_key, Token};

use builtin::BUILTIN_SKILLS;

/// One lexicon phrase found in a token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillHit {
    pub canonical: String,
    /// The alias as it appeared (lowercased, token-joined).
    pub surface: String,
    /// Index of the first token of the phrase.
    pub token_index: usize,
    /// Number of tokens the phrase spans.
    pub token_len: usize,
    /// Byte offset of the phrase in the source text.
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SkillLexicon {
    /// Alias phrase key → canonical phrase key.
    aliases: HashMap<String, String>,
    max_phrase_tokens: usize,
}

impl SkillLexicon {
    /// Lexicon containing only the built-in skill table.
    pub fn builtin() -> Self {
        let mut lexicon = Self::default();
        for (canonical, aliases) in BUILTIN_SKILLS {
            lexicon.insert(canonical, aliases.iter().copied());
        }
        lexicon
    }

    /// Built-in lexicon extended with an optional JSON synonym file of the
    /// shape `{ "canonical": ["alias", ...] }`.
    pub fn load(synonyms_path: Option<&Path>) -> Result<Self> {
        let mut lexicon = Self::builtin();
        if let Some(path) = synonyms_path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read synonyms file {}", path.display()))?;
            let custom: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
                .with_context(|| format!("Synonyms file {} is not valid JSON", path.display()))?;
            info!(
                "Merging {} custom skill entries from {}",
                custom.len(),
                path.display()
            );
            lexicon.merge(custom);
        }
        Ok(lexicon)
    }

    /// Adds custom entries. Custom aliases override built-in ones.
    pub fn merge(&mut self, entries: BTreeMap<String, Vec<String>>) {
        for (canonical, aliases) in &entries {
            let canonical_key = phrase_key(canonical);
            if canonical_key.is_empty() {
                warn!("Skipping synonym entry with empty canonical name");
                continue;
            }
            for alias in aliases {
                let alias_key = phrase_key(alias);
                if let Some(previous) = self.aliases.get(&alias_key) {
                    if *previous != canonical_key {
                        warn!("Synonym '{alias_key}' remapped from '{previous}' to '{canonical_key}'");
                    }
                }
            }
            self.insert(canonical, aliases.iter().map(String::as_str));
        }
    }

    fn insert<'a>(&mut self, canonical: &str, aliases: impl Iterator<Item = &'a str>) {
        let canonical_key = phrase_key(canonical);
        if canonical_key.is_empty() {
            return;
        }
        self.register(canonical_key.clone(), canonical_key.clone());
        for alias in aliases {
            let alias_key = phrase_key(alias);
            if !alias_key.is_empty() {
                self.register(alias_key, canonical_key.clone());
            }
        }
    }

    fn register(&mut self, alias_key: String, canonical_key: String) {
        let tokens = alias_key.split(' ').count();
        self.max_phrase_tokens = self.max_phrase_tokens.max(tokens);
        self.aliases.insert(alias_key, canonical_key);
    }

    /// Canonical name for a phrase, if the phrase is a known skill or alias.
    #[cfg(test)]
    pub fn canonical_of(&self, phrase: &str) -> Option<&str> {
        self.aliases.get(&phrase_key(phrase)).map(String::as_str)
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Greedy longest-match scan over the token stream. Phrases never overlap,
    /// so "machine learning" is one hit rather than "machine" + "learning".
    pub fn detect(&self, tokens: &[Token]) -> Vec<SkillHit> {
        let mut hits = Vec::new();
        let mut idx = 0;

        while idx < tokens.len() {
            let longest = self.max_phrase_tokens.min(tokens.len() - idx);
            let found = (1..=longest).rev().find_map(|len| {
                let key = tokens[idx..idx + len]
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.aliases
                    .get(&key)
                    .map(|canonical| (len, key, canonical.clone()))
            });

            match found {
                Some((len, surface, canonical)) => {
                    hits.push(SkillHit {
                        canonical,
                        surface,
                        token_index: idx,
                        token_len: len,
                        offset: tokens[idx].offset,
                    });
                    idx += len;
                }
                None => {
                    // "java/kotlin" is one token; look its pieces up individually.
                    let token = &tokens[idx];
                    if token.text.contains('/') {
                        let mut piece_offset = token.offset;
                        for piece in token.text.split('/') {
                            if let Some(canonical) = self.aliases.get(piece) {
                                hits.push(SkillHit {
                                    canonical: canonical.clone(),
                                    surface: piece.to_string(),
                                    token_index: idx,
                                    token_len: 1,
                                    offset: piece_offset,
                                });
                            }
                            piece_offset += piece.len() + 1;
                        }
                    }
                    idx += 1;
                }
            }
        }

        hits
    }
}
