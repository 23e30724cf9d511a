//! Import job API handlers
//!
//! POST /import/:kind/start, GET /import/jobs, GET /import/jobs/:job_id,
//! POST /import/jobs/:job_id/cancel

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{ImportJob, JobState};
use crate::schema::ImportKind;
use crate::services::ImportJobOrchestrator;
use crate::AppState;

const RECENT_JOBS_LIMIT: u32 = 20;

/// POST /import/:kind/start query string
#[derive(Debug, Deserialize)]
pub struct StartImportQuery {
    pub file_name: Option<String>,
}

/// POST /import/:kind/start response
#[derive(Debug, Serialize)]
pub struct StartImportResponse {
    pub job_id: Uuid,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
}

/// GET /import/jobs/:job_id response
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    #[serde(flatten)]
    pub job: ImportJob,
    pub percentage: f32,
    /// Rendered `"Fila {row}: {message}"` lines, empty until the job ends
    pub error_lines: Vec<String>,
}

/// GET /import/jobs response
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<ImportJob>,
}

/// POST /import/jobs/:job_id/cancel response
#[derive(Debug, Serialize)]
pub struct CancelImportResponse {
    pub job_id: Uuid,
    pub cancel_requested_at: DateTime<Utc>,
}

/// POST /import/:kind/start
///
/// Body is the raw CSV file. Returns 202 Accepted with the job id; the
/// import itself runs in a background task.
pub async fn start_import(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<StartImportQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<StartImportResponse>)> {
    let kind: ImportKind = kind.parse().map_err(ApiError::BadRequest)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let file_name = query
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{}.csv", kind));

    let job = ImportJob::new(kind, file_name);
    let response = StartImportResponse {
        job_id: job.job_id,
        state: job.state,
        started_at: job.started_at,
    };

    crate::db::import_jobs::save_job(&state.db, &job).await?;

    let cancel = CancellationToken::new();
    state
        .cancellation_tokens
        .write()
        .await
        .insert(job.job_id, cancel.clone());

    tracing::info!(
        job_id = %job.job_id,
        kind = %kind,
        file_name = %job.file_name,
        bytes = body.len(),
        "Import job accepted"
    );

    let task_state = state.clone();
    tokio::spawn(async move {
        let job_id = job.job_id;
        let orchestrator = ImportJobOrchestrator::new(
            task_state.db.clone(),
            task_state.event_bus.clone(),
            task_state.store.clone(),
            task_state.options.clone(),
        );

        if let Err(e) = orchestrator.execute(job, body.to_vec(), cancel).await {
            tracing::error!(job_id = %job_id, error = %e, "Failed to record import job");
            *task_state.last_error.write().await = Some(e.to_string());
        }

        task_state.cancellation_tokens.write().await.remove(&job_id);
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /import/jobs/:job_id
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = crate::db::import_jobs::load_job(&state.db, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import job not found: {}", job_id)))?;

    tracing::debug!(job_id = %job_id, state = ?job.state, "Status query");

    let error_lines = job
        .outcome
        .as_ref()
        .map(|outcome| outcome.error_lines(state.options.locale))
        .unwrap_or_default();

    Ok(Json(JobStatusResponse {
        percentage: job.progress.percentage(),
        error_lines,
        job,
    }))
}

/// GET /import/jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<JobListResponse>> {
    let jobs = crate::db::import_jobs::list_recent_jobs(&state.db, RECENT_JOBS_LIMIT).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// POST /import/jobs/:job_id/cancel
///
/// Rows already sent to the store are kept; rows not yet started are
/// reported as cancelled.
pub async fn cancel_import(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<CancelImportResponse>> {
    let job = crate::db::import_jobs::load_job(&state.db, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import job not found: {}", job_id)))?;

    if job.is_terminal() {
        return Err(ApiError::BadRequest(format!(
            "Import job already in terminal state: {:?}",
            job.state
        )));
    }

    let token = state.cancellation_tokens.read().await.get(&job_id).cloned();
    match token {
        Some(token) => token.cancel(),
        None => {
            // Finished between the load above and now, or orphaned by a restart
            return Err(ApiError::Conflict(format!(
                "Import job is not running in this process: {}",
                job_id
            )));
        }
    }

    tracing::info!(job_id = %job_id, "Import job cancellation requested");

    Ok(Json(CancelImportResponse {
        job_id,
        cancel_requested_at: Utc::now(),
    }))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/:kind/start", post(start_import))
        .route("/import/jobs", get(list_jobs))
        .route("/import/jobs/:job_id", get(get_job_status))
        .route("/import/jobs/:job_id/cancel", post(cancel_import))
}
