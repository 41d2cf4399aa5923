pub mod document;
pub mod match_result;
pub mod requirement;

pub use document::{DetectedSkill, Document, DocumentFormat, DocumentId};
pub use match_result::{MatchKind, MatchResult, MatchedTerm};
pub use requirement::{Importance, Requirement, RequirementKind, RequirementSet};
