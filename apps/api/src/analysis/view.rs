//! Analyzer panel state as an immutable value. Each request advances it
//! through an explicit transition; the server keeps the latest view per
//! session so the presentation layer can poll it.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Analyzing,
    Completed {
        analysis_id: Uuid,
        results: usize,
        failures: usize,
        top_score: Option<f64>,
    },
    Failed {
        code: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalyzerView {
    /// Number of analyses submitted in this session.
    pub submissions: u32,
    pub staged_files: usize,
    pub job_description_chars: usize,
    pub status: AnalysisStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewTransition {
    Submitted {
        files: usize,
        job_description_chars: usize,
    },
    Completed {
        analysis_id: Uuid,
        results: usize,
        failures: usize,
        top_score: Option<f64>,
    },
    Failed {
        code: String,
        message: String,
    },
}

impl AnalyzerView {
    pub fn is_in_flight(&self) -> bool {
        matches!(self.status, AnalysisStatus::Analyzing)
    }

    /// Returns the next view. Outcomes arriving while nothing is in flight
    /// leave the view unchanged.
    pub fn apply(&self, transition: ViewTransition) -> AnalyzerView {
        match transition {
            ViewTransition::Submitted {
                files,
                job_description_chars,
            } => AnalyzerView {
                submissions: self.submissions.saturating_add(1),
                staged_files: files,
                job_description_chars,
                status: AnalysisStatus::Analyzing,
            },
            ViewTransition::Completed { .. } | ViewTransition::Failed { .. }
                if !self.is_in_flight() =>
            {
                self.clone()
            }
            ViewTransition::Completed {
                analysis_id,
                results,
                failures,
                top_score,
            } => AnalyzerView {
                status: AnalysisStatus::Completed {
                    analysis_id,
                    results,
                    failures,
                    top_score,
                },
                ..self.clone()
            },
            ViewTransition::Failed { code, message } => AnalyzerView {
                status: AnalysisStatus::Failed { code, message },
                ..self.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(view: &AnalyzerView, files: usize) -> AnalyzerView {
        view.apply(ViewTransition::Submitted {
            files,
            job_description_chars: 120,
        })
    }

    #[test]
    fn test_default_view_is_idle() {
        let view = AnalyzerView::default();
        assert_eq!(view.status, AnalysisStatus::Idle);
        assert!(!view.is_in_flight());
    }

    #[test]
    fn test_submit_then_complete() {
        let start = AnalyzerView::default();
        let analyzing = submitted(&start, 3);
        assert!(analyzing.is_in_flight());
        assert_eq!(analyzing.submissions, 1);
        assert_eq!(analyzing.staged_files, 3);

        let id = Uuid::nil();
        let done = analyzing.apply(ViewTransition::Completed {
            analysis_id: id,
            results: 2,
            failures: 1,
            top_score: Some(87.5),
        });
        assert!(!done.is_in_flight());
        assert_eq!(done.staged_files, 3);
        assert!(matches!(done.status, AnalysisStatus::Completed { results: 2, .. }));

        // The previous value is untouched.
        assert!(analyzing.is_in_flight());
    }

    #[test]
    fn test_outcome_without_submission_is_ignored() {
        let idle = AnalyzerView::default();
        let next = idle.apply(ViewTransition::Failed {
            code: "EMPTY_INPUT".to_string(),
            message: "job description is empty".to_string(),
        });
        assert_eq!(next, idle);
    }

    #[test]
    fn test_resubmission_counts_and_restarts() {
        let first = submitted(&AnalyzerView::default(), 1);
        let failed = first.apply(ViewTransition::Failed {
            code: "NO_DOCUMENTS".to_string(),
            message: "none".to_string(),
        });
        let second = submitted(&failed, 2);
        assert_eq!(second.submissions, 2);
        assert_eq!(second.status, AnalysisStatus::Analyzing);
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let json = serde_json::to_value(AnalysisStatus::Analyzing).unwrap();
        assert_eq!(json["state"], "analyzing");
    }
}
