//! Axum route handlers for the screening API.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::candidate::Candidate;
use crate::models::job::{JobDescriptionInput, JobDescriptionSource};
use crate::screening::jd_writer::write_job_description;
use crate::screening::notifications::{attach, compose};
use crate::screening::scoring::{score_resumes, ResumeText};
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";
const MISSING_JD_MESSAGE: &str = "Please provide a job description first.";

type SessionHeader = [(&'static str, String); 1];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JobDescriptionResponse {
    pub session_id: Uuid,
    pub source: JobDescriptionSource,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub session_id: Uuid,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    data: Bytes,
}

/// Multipart fields of a job description submission.
#[derive(Debug, Default)]
struct JobDescriptionForm {
    file: Option<UploadedFile>,
    text: Option<String>,
    fields: JobDescriptionInput,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/job-description
///
/// Sets the session's job description from, in priority order: an uploaded
/// `jd_file`, free `jd_text`, or structured fields (`job_title` and `skills`
/// required) sent to the generative service.
pub async fn handle_submit_job_description(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(SessionHeader, Json<JobDescriptionResponse>), AppError> {
    let session_id = session_id_from(&headers)?;
    let JobDescriptionForm { file, text, fields } =
        read_job_description_form(multipart, state.config.max_upload_bytes).await?;

    let (job_description, source) = if let Some(file) = file {
        let text = extract_text(file.data, &file.filename).await.map_err(|e| {
            AppError::UnprocessableEntity(format!("Could not read {}: {e}", file.filename))
        })?;
        if text.trim().is_empty() {
            return Err(AppError::UnprocessableEntity(format!(
                "No text could be extracted from {}",
                file.filename
            )));
        }
        (text, JobDescriptionSource::Upload)
    } else if let Some(text) = text {
        (text, JobDescriptionSource::Text)
    } else if fields.has_required_fields() {
        let text = write_job_description(&fields, &state.llm).await?;
        (text, JobDescriptionSource::Generated)
    } else {
        return Err(AppError::Validation(
            "Provide a jd_file, jd_text, or at least job_title and skills".to_string(),
        ));
    };

    let session_id = match session_id {
        Some(id) if state.sessions.get(id).await.is_some() => id,
        _ => state.sessions.create().await,
    };
    if !state
        .sessions
        .set_job_description(session_id, job_description.clone(), source)
        .await
    {
        return Err(AppError::NotFound(format!("Session {session_id} expired")));
    }
    info!("Session {session_id}: job description set from {source:?}");

    Ok((
        [(SESSION_HEADER, session_id.to_string())],
        Json(JobDescriptionResponse {
            session_id,
            source,
            job_description,
        }),
    ))
}

/// GET /api/v1/job-description
pub async fn handle_get_job_description(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    let session_id = require_session_id(&headers)?;
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    let source = session
        .job_description_source
        .ok_or_else(|| AppError::NotFound("No job description set".to_string()))?;

    Ok(Json(JobDescriptionResponse {
        session_id,
        source,
        job_description: session.job_description,
    }))
}

/// POST /api/v1/evaluations
///
/// Scores every uploaded `resumes` file against the session's job description,
/// ranks them, and attaches an outcome email to each candidate.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(SessionHeader, Json<EvaluationResponse>), AppError> {
    let session_id = session_id_from(&headers)?
        .ok_or_else(|| AppError::PreconditionFailed(MISSING_JD_MESSAGE.to_string()))?;
    let jd_text = state
        .sessions
        .job_description(session_id)
        .await
        .ok_or_else(|| AppError::PreconditionFailed(MISSING_JD_MESSAGE.to_string()))?;

    let files = read_resume_files(multipart, state.config.max_upload_bytes).await?;
    if files.is_empty() {
        return Err(AppError::Validation(
            "At least one resume file is required".to_string(),
        ));
    }
    info!("Session {session_id}: evaluating {} resumes", files.len());

    let mut resumes = Vec::with_capacity(files.len());
    for file in files {
        let text = match extract_text(file.data, &file.filename).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Treating {} as empty: {e}", file.filename);
                String::new()
            }
        };
        resumes.push(ResumeText {
            filename: file.filename,
            text,
        });
    }

    let concurrency = state.config.evaluation_concurrency;
    let mut candidates = score_resumes(&jd_text, resumes, &state.llm, concurrency).await;
    let notifications = compose(&jd_text, &candidates, &state.llm, concurrency).await;
    attach(&mut candidates, notifications);

    if !state
        .sessions
        .set_candidates(session_id, candidates.clone())
        .await
    {
        return Err(AppError::NotFound(format!(
            "Session {session_id} expired during evaluation"
        )));
    }

    Ok((
        [(SESSION_HEADER, session_id.to_string())],
        Json(EvaluationResponse {
            session_id,
            candidates,
        }),
    ))
}

/// GET /api/v1/candidates
pub async fn handle_get_candidates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EvaluationResponse>, AppError> {
    let session_id = require_session_id(&headers)?;
    let candidates = state
        .sessions
        .candidates(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    Ok(Json(EvaluationResponse {
        session_id,
        candidates,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn session_id_from(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(raw) = headers.get(SESSION_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::Validation(format!("{SESSION_HEADER} must be a UUID")))
}

fn require_session_id(headers: &HeaderMap) -> Result<Uuid, AppError> {
    session_id_from(headers)?
        .ok_or_else(|| AppError::Validation(format!("{SESSION_HEADER} header is required")))
}

async fn read_job_description_form(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<JobDescriptionForm, AppError> {
    let mut form = JobDescriptionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "jd_file" => {
                let file = read_file(field, max_bytes).await?;
                if !file.filename.is_empty() && form.file.is_none() {
                    form.file = Some(file);
                }
            }
            "jd_text" => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    form.text = Some(text);
                }
            }
            "job_title" => form.fields.job_title = read_text(field).await?,
            "experience" => form.fields.experience = read_text(field).await?,
            "skills" => form.fields.skills = read_text(field).await?,
            "company_name" => form.fields.company_name = read_text(field).await?,
            "employment_type" => form.fields.employment_type = read_text(field).await?,
            "industry" => form.fields.industry = read_text(field).await?,
            "location" => form.fields.location = read_text(field).await?,
            _ => {
                read_bytes(field).await?;
            }
        }
    }

    Ok(form)
}

async fn read_resume_files(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("resumes") {
            let file = read_file(field, max_bytes).await?;
            if !file.filename.is_empty() {
                files.push(file);
            }
        } else {
            read_bytes(field).await?;
        }
    }

    Ok(files)
}

async fn read_file(field: Field<'_>, max_bytes: usize) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or("").to_string();
    let data = read_bytes(field).await?;
    if data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "{filename} is too large ({} bytes, limit {max_bytes})",
            data.len()
        )));
    }
    Ok(UploadedFile { filename, data })
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

async fn read_bytes(field: Field<'_>) -> Result<Bytes, AppError> {
    field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}
