use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::view::{AnalyzerView, ViewTransition};
use crate::analysis::{AnalysisError, AnalysisReport, IngestBatch};
use crate::errors::AppError;
use crate::ingest::RawFile;
use crate::models::RequirementSet;
use crate::state::AppState;

/// Multipart fields accepted by the upload endpoints.
#[derive(Default)]
struct UploadForm {
    job_description: Option<String>,
    session_id: Option<String>,
    files: Vec<RawFile>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable job description: {e}")))?;
                form.job_description = Some(text);
            }
            "session_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable session id: {e}")))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    form.session_id = Some(trimmed.to_string());
                }
            }
            "files" | "files[]" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("upload-{}", form.files.len() + 1));
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file '{filename}': {e}")))?;
                form.files.push(RawFile::new(filename, content_type, bytes));
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    Ok(form)
}

/// POST /api/v1/analyses
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let form = read_upload_form(multipart).await?;
    let job_description = form.job_description.unwrap_or_default();

    let outcome = match form.session_id {
        None => state.engine.analyze(job_description, form.files).await,
        Some(session_id) => {
            let mut ticket =
                state
                    .sessions
                    .begin(&session_id, form.files.len(), job_description.chars().count());
            debug!("Session {}: analysis submitted", ticket.session_id());
            let outcome = ticket
                .run(state.engine.analyze(job_description, form.files))
                .await;
            if !ticket.settle(view_transition(&outcome)) {
                info!("Session {session_id}: outcome discarded, a newer analysis owns the session");
            }
            outcome
        }
    };

    Ok(Json(outcome?))
}

fn view_transition(outcome: &Result<AnalysisReport, AnalysisError>) -> ViewTransition {
    match outcome {
        Ok(report) => ViewTransition::Completed {
            analysis_id: report.analysis_id,
            results: report.results.len(),
            failures: report.failures.len(),
            top_score: report.results.first().map(|r| r.score),
        },
        Err(error) => ViewTransition::Failed {
            code: error.code().to_string(),
            message: error.to_string(),
        },
    }
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub jd_text: String,
}

/// POST /api/v1/requirements
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<RequirementSet>, AppError> {
    let requirements = state.engine.extract(req.jd_text).await?;
    Ok(Json(requirements))
}

/// POST /api/v1/documents
pub async fn handle_ingest(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IngestBatch>, AppError> {
    let form = read_upload_form(multipart).await?;
    let batch = state.engine.ingest(form.files).await?;
    Ok(Json(batch))
}

/// GET /api/v1/sessions/:id
pub async fn handle_session_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalyzerView>, AppError> {
    state
        .sessions
        .view(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
