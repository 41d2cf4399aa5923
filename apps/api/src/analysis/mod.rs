//! Analysis pipeline: ingestion ‖ extraction → per-document scoring → join →
//! rank.
//!
//! All CPU-bound work runs on the blocking pool. Each file and each scoring
//! pass is its own task in a `JoinSet`, so a failure in one document is
//! isolated, and dropping the pipeline future aborts whatever hasn't started.

pub mod session;
pub mod view;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ingest::{ingest_document, IngestError, IngestOptions, RawFile};
use crate::matching::{rank_results, Scorer};
use crate::models::{Document, MatchResult, RequirementSet};
use crate::requirements::{extract_requirements, ExtractError};
use crate::skills::SkillLexicon;

/// A file that produced no Match Result, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFailure {
    pub position: usize,
    pub filename: String,
    pub code: String,
    pub message: String,
}

impl DocumentFailure {
    fn from_ingest(position: usize, filename: String, error: &IngestError) -> Self {
        Self {
            position,
            filename,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Documents that ingested cleanly plus the files that didn't, both in upload
/// order.
#[derive(Debug, Serialize)]
pub struct IngestBatch {
    pub documents: Vec<Document>,
    pub failures: Vec<DocumentFailure>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub scorer: &'static str,
    pub requirements: RequirementSet,
    /// Ranked best first.
    pub results: Vec<MatchResult>,
    pub failures: Vec<DocumentFailure>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("job description is empty")]
    EmptyInput,

    #[error("no resume files were uploaded")]
    NoFiles,

    #[error("{actual} files uploaded, the limit is {limit}")]
    TooManyFiles { limit: usize, actual: usize },

    #[error("none of the {} uploaded files could be ingested", failures.len())]
    NoDocuments { failures: Vec<DocumentFailure> },

    #[error("superseded by a newer analysis in the same session")]
    Superseded,

    #[error("background task failed: {0}")]
    Task(String),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "EMPTY_INPUT",
            AnalysisError::NoFiles | AnalysisError::TooManyFiles { .. } => "VALIDATION_ERROR",
            AnalysisError::NoDocuments { .. } => "NO_DOCUMENTS",
            AnalysisError::Superseded => "SUPERSEDED",
            AnalysisError::Task(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ExtractError> for AnalysisError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::EmptyInput => AnalysisError::EmptyInput,
        }
    }
}

/// Shared, read-only pipeline configuration.
pub struct AnalysisEngine {
    lexicon: Arc<SkillLexicon>,
    scorer: Arc<dyn Scorer>,
    max_file_bytes: usize,
    max_files: usize,
}

impl AnalysisEngine {
    pub fn new(
        lexicon: SkillLexicon,
        scorer: Arc<dyn Scorer>,
        max_file_bytes: usize,
        max_files: usize,
    ) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
            scorer,
            max_file_bytes,
            max_files,
        }
    }

    pub fn scorer_backend(&self) -> &'static str {
        self.scorer.backend()
    }

    /// Full analysis of one job description against a batch of resumes.
    pub async fn analyze(
        &self,
        job_description: String,
        files: Vec<RawFile>,
    ) -> Result<AnalysisReport, AnalysisError> {
        if job_description.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        self.check_batch(&files)?;

        let analysis_id = Uuid::new_v4();
        info!(
            "Analysis {analysis_id}: {} files, {} chars of job description",
            files.len(),
            job_description.chars().count()
        );

        let (requirements, batch) = tokio::join!(
            self.extract(job_description),
            self.ingest_batch(files)
        );
        let requirements = Arc::new(requirements?);
        if requirements.is_empty() {
            warn!("Analysis {analysis_id}: no requirements found in the job description, every score will be 0");
        }
        let IngestBatch {
            documents,
            mut failures,
        } = batch?;

        if documents.is_empty() {
            return Err(AnalysisError::NoDocuments { failures });
        }

        let (results, scoring_failures) =
            self.score_all(Arc::clone(&requirements), documents).await?;
        failures.extend(scoring_failures);
        failures.sort_by_key(|f| f.position);

        info!(
            "Analysis {analysis_id}: {} requirements, {} results, {} failures, top score {:?}",
            requirements.len(),
            results.len(),
            failures.len(),
            results.first().map(|r| r.score)
        );

        Ok(AnalysisReport {
            analysis_id,
            scorer: self.scorer.backend(),
            requirements: Arc::unwrap_or_clone(requirements),
            results,
            failures,
        })
    }

    /// Requirement extraction on the blocking pool.
    pub async fn extract(&self, job_description: String) -> Result<RequirementSet, AnalysisError> {
        let lexicon = Arc::clone(&self.lexicon);
        let requirements = tokio::task::spawn_blocking(move || {
            extract_requirements(&job_description, &lexicon)
        })
        .await
        .map_err(|e| AnalysisError::Task(format!("spawn_blocking failed in extraction: {e}")))??;
        Ok(requirements)
    }

    /// Ingestion preview: validates the batch and ingests it without scoring.
    pub async fn ingest(&self, files: Vec<RawFile>) -> Result<IngestBatch, AnalysisError> {
        self.check_batch(&files)?;
        self.ingest_batch(files).await
    }

    fn check_batch(&self, files: &[RawFile]) -> Result<(), AnalysisError> {
        if files.is_empty() {
            return Err(AnalysisError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(AnalysisError::TooManyFiles {
                limit: self.max_files,
                actual: files.len(),
            });
        }
        Ok(())
    }

    async fn ingest_batch(&self, files: Vec<RawFile>) -> Result<IngestBatch, AnalysisError> {
        let options = IngestOptions {
            max_file_bytes: self.max_file_bytes,
            reference_year: Utc::now().year(),
        };

        let mut tasks = JoinSet::new();
        for (position, file) in files.into_iter().enumerate() {
            let lexicon = Arc::clone(&self.lexicon);
            tasks.spawn_blocking(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    ingest_document(position, &file, &lexicon, &options)
                }))
                .unwrap_or_else(|_| Err(IngestError::Parse("ingestion aborted".to_string())));
                (position, file.filename, outcome)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| AnalysisError::Task(format!("ingestion task failed: {e}")))?;
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|(position, _, _)| *position);

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (position, filename, outcome) in outcomes {
            match outcome {
                Ok(document) => documents.push(document),
                Err(error) => {
                    warn!("Ingestion failed for '{filename}': {error}");
                    failures.push(DocumentFailure::from_ingest(position, filename, &error));
                }
            }
        }

        Ok(IngestBatch {
            documents,
            failures,
        })
    }

    /// Scores each document in its own task and joins before ranking.
    async fn score_all(
        &self,
        requirements: Arc<RequirementSet>,
        documents: Vec<Document>,
    ) -> Result<(Vec<MatchResult>, Vec<DocumentFailure>), AnalysisError> {
        let mut tasks = JoinSet::new();
        for document in documents {
            let scorer = Arc::clone(&self.scorer);
            let requirements = Arc::clone(&requirements);
            tasks.spawn_blocking(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    scorer.score(&document, &requirements)
                }));
                (document.position, document.filename, outcome.ok())
            });
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (position, filename, result) =
                joined.map_err(|e| AnalysisError::Task(format!("scoring task failed: {e}")))?;
            match result {
                Some(result) => results.push(result),
                None => {
                    warn!("Scoring failed for '{filename}'");
                    failures.push(DocumentFailure {
                        position,
                        filename,
                        code: "SCORING_ERROR".to_string(),
                        message: "scoring aborted".to_string(),
                    });
                }
            }
        }

        Ok((rank_results(results), failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{score_document, KeywordScorer};
    use crate::models::Document;

    const JD: &str = "Senior Frontend Engineer\n\
        Requirements:\n\
        - React and TypeScript\n\
        - 3+ years of experience\n\
        Nice to have: GraphQL, Docker";

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(SkillLexicon::builtin(), Arc::new(KeywordScorer), 1024 * 1024, 10)
    }

    fn text_file(name: &str, body: &str) -> RawFile {
        RawFile::new(name, Some("text/plain".to_string()), body.as_bytes().to_vec())
    }

    fn batch_with_corrupt_pdf() -> Vec<RawFile> {
        vec![
            text_file("ana.txt", "React, TypeScript, GraphQL and Docker. 5 years of experience."),
            text_file("ben.txt", "TypeScript and Docker. 4 years of experience."),
            RawFile::new("broken.pdf", None, b"%PDF-1.7\nnot really a pdf".to_vec()),
            text_file("cai.txt", "React and TypeScript, 2019 - 2023."),
            text_file("dee.txt", "Python and machine learning."),
        ]
    }

    #[tokio::test]
    async fn test_corrupt_file_is_isolated() {
        let report = engine()
            .analyze(JD.to_string(), batch_with_corrupt_pdf())
            .await
            .unwrap();

        assert_eq!(report.results.len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].filename, "broken.pdf");
        assert_eq!(report.failures[0].position, 2);
        assert_eq!(report.failures[0].code, "PARSE_ERROR");
        assert_eq!(report.scorer, "keyword");

        assert_eq!(report.results[0].filename, "ana.txt");
        assert_eq!(report.results[0].score, 100.0);
        for pair in report.results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_analysis_is_deterministic_apart_from_id() {
        let first = engine().analyze(JD.to_string(), batch_with_corrupt_pdf()).await.unwrap();
        let second = engine().analyze(JD.to_string(), batch_with_corrupt_pdf()).await.unwrap();

        assert_ne!(first.analysis_id, second.analysis_id);
        assert_eq!(first.requirements, second.requirements);
        assert_eq!(first.results, second.results);
        assert_eq!(first.failures, second.failures);
    }

    #[tokio::test]
    async fn test_empty_job_description_yields_no_results() {
        let err = engine()
            .analyze("  \n\t".to_string(), batch_with_corrupt_pdf())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput));
        assert_eq!(err.code(), "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_all_files_failing_is_no_documents() {
        let files = vec![
            RawFile::new("a.png", None, vec![0x89, b'P', b'N', b'G']),
            text_file("b.txt", "   "),
        ];
        match engine().analyze(JD.to_string(), files).await {
            Err(AnalysisError::NoDocuments { failures }) => {
                let codes: Vec<&str> = failures.iter().map(|f| f.code.as_str()).collect();
                assert_eq!(codes, vec!["UNSUPPORTED_FORMAT", "PARSE_ERROR"]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let err = engine().analyze(JD.to_string(), vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NoFiles));

        let files = (0..11).map(|i| text_file(&format!("{i}.txt"), "React")).collect();
        let err = engine().analyze(JD.to_string(), files).await.unwrap_err();
        assert!(matches!(err, AnalysisError::TooManyFiles { limit: 10, actual: 11 }));
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_oversized_file_fails_alone() {
        let small = AnalysisEngine::new(SkillLexicon::builtin(), Arc::new(KeywordScorer), 32, 10);
        let files = vec![
            text_file("short.txt", "React"),
            text_file("long.txt", &"TypeScript ".repeat(10)),
        ];
        let report = small.analyze(JD.to_string(), files).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures[0].code, "SIZE_LIMIT_EXCEEDED");
    }

    struct FlakyScorer;

    impl Scorer for FlakyScorer {
        fn backend(&self) -> &'static str {
            "flaky"
        }

        fn score(&self, document: &Document, requirements: &RequirementSet) -> MatchResult {
            if document.filename == "ben.txt" {
                panic!("scorer crashed");
            }
            score_document(document, requirements)
        }
    }

    #[tokio::test]
    async fn test_panicking_scorer_is_isolated() {
        let engine = AnalysisEngine::new(SkillLexicon::builtin(), Arc::new(FlakyScorer), 1024 * 1024, 10);
        let report = engine.analyze(JD.to_string(), batch_with_corrupt_pdf()).await.unwrap();

        assert_eq!(report.results.len(), 3);
        let failed: Vec<(&str, &str)> = report
            .failures
            .iter()
            .map(|f| (f.filename.as_str(), f.code.as_str()))
            .collect();
        assert_eq!(failed, vec![("ben.txt", "SCORING_ERROR"), ("broken.pdf", "PARSE_ERROR")]);
    }

    #[tokio::test]
    async fn test_ingest_preview_keeps_upload_order() {
        let batch = engine().ingest(batch_with_corrupt_pdf()).await.unwrap();
        let names: Vec<&str> = batch.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["ana.txt", "ben.txt", "cai.txt", "dee.txt"]);
        assert_eq!(batch.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_extract_runs_on_blocking_pool() {
        let set = engine().extract(JD.to_string()).await.unwrap();
        assert!(set.get("react").unwrap().mandatory);
        assert!(!set.get("graphql").unwrap().mandatory);
    }
}
