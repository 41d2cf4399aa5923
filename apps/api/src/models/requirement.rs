use serde::{Deserialize, Serialize};

/// How strongly the job description asks for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// "required", "must have" — absence caps the score.
    Required,
    /// "nice to have", "preferred", "a plus".
    Preferred,
    /// Named in the text without a qualifying marker.
    Mentioned,
}

impl Importance {
    pub fn base_weight(self) -> f64 {
        match self {
            Importance::Required => 2.0,
            Importance::Preferred => 1.0,
            Importance::Mentioned => 0.5,
        }
    }

    pub fn is_mandatory(self) -> bool {
        matches!(self, Importance::Required)
    }

    fn strength(self) -> u8 {
        match self {
            Importance::Required => 2,
            Importance::Preferred => 1,
            Importance::Mentioned => 0,
        }
    }

    /// The stronger of two classifications for the same term.
    pub fn strongest(self, other: Importance) -> Importance {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementKind {
    /// A canonical lexicon skill, matched through synonyms.
    Skill,
    /// A free-form list item, matched as an exact phrase.
    Phrase,
    /// "N+ years" of experience.
    Experience { min_years: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub term: String,
    pub kind: RequirementKind,
    pub importance: Importance,
    pub mandatory: bool,
    pub weight: f64,
    /// How many times the term is mentioned in the job description.
    pub mentions: u32,
    /// Byte offset of the first mention.
    pub first_position: usize,
}

/// Ordered requirements parsed from one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    requirements: Vec<Requirement>,
}

impl RequirementSet {
    /// Orders by weight descending, then first position, then term.
    pub fn from_requirements(mut requirements: Vec<Requirement>) -> Self {
        requirements.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.first_position.cmp(&b.first_position))
                .then_with(|| a.term.cmp(&b.term))
        });
        Self { requirements }
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    #[cfg(test)]
    pub fn get(&self, term: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.term == term)
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.mandatory)
    }

    pub fn total_weight(&self) -> f64 {
        self.requirements.iter().map(|r| r.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(term: &str, importance: Importance, weight: f64, first_position: usize) -> Requirement {
        Requirement {
            term: term.to_string(),
            kind: RequirementKind::Skill,
            importance,
            mandatory: importance.is_mandatory(),
            weight,
            mentions: 1,
            first_position,
        }
    }

    #[test]
    fn test_set_orders_by_weight_then_position() {
        let set = RequirementSet::from_requirements(vec![
            req("docker", Importance::Preferred, 1.1, 40),
            req("rust", Importance::Required, 2.2, 90),
            req("kafka", Importance::Preferred, 1.1, 10),
        ]);
        let terms: Vec<&str> = set.requirements().iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["rust", "kafka", "docker"]);
    }

    #[test]
    fn test_strongest_importance_wins() {
        assert_eq!(
            Importance::Mentioned.strongest(Importance::Required),
            Importance::Required
        );
        assert_eq!(
            Importance::Required.strongest(Importance::Preferred),
            Importance::Required
        );
    }

    #[test]
    fn test_kind_serializes_tagged() {
        let json = serde_json::to_value(RequirementKind::Experience { min_years: 5 }).unwrap();
        assert_eq!(json["type"], "experience");
        assert_eq!(json["min_years"], 5);
    }

    #[test]
    fn test_total_weight_and_mandatory() {
        let set = RequirementSet::from_requirements(vec![
            req("rust", Importance::Required, 2.0, 0),
            req("kafka", Importance::Preferred, 1.0, 5),
        ]);
        assert!((set.total_weight() - 3.0).abs() < f64::EPSILON);
        assert_eq!(set.mandatory().count(), 1);
        assert_eq!(set.get("kafka").map(|r| r.mentions), Some(1));
    }
}
