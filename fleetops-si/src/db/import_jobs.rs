//! Import job persistence

use chrono::{DateTime, Utc};
use fleetops_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ImportJob, ImportOutcome, ImportProgress, JobState};
use crate::schema::ImportKind;

const SELECT_COLUMNS: &str = r#"
    SELECT job_id, kind, file_name, state,
           progress_processed, progress_total,
           outcome, error_message, started_at, ended_at
    FROM import_jobs
"#;

/// Insert or update a job (keyed on job_id)
pub async fn save_job(pool: &SqlitePool, job: &ImportJob) -> Result<()> {
    let job_id = job.job_id.to_string();
    let kind = job.kind.as_str();
    let state = serde_json::to_string(&job.state)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;
    let outcome = job
        .outcome
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize outcome: {}", e)))?;
    let started_at = job.started_at.to_rfc3339();
    let ended_at = job.ended_at.map(|dt| dt.to_rfc3339());

    sqlx::query(
        r#"
        INSERT INTO import_jobs (
            job_id, kind, file_name, state,
            progress_processed, progress_total,
            outcome, error_message, started_at, ended_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(job_id) DO UPDATE SET
            state = excluded.state,
            progress_processed = excluded.progress_processed,
            progress_total = excluded.progress_total,
            outcome = excluded.outcome,
            error_message = excluded.error_message,
            ended_at = excluded.ended_at
        "#,
    )
    .bind(&job_id)
    .bind(kind)
    .bind(&job.file_name)
    .bind(&state)
    .bind(job.progress.processed as i64)
    .bind(job.progress.total as i64)
    .bind(&outcome)
    .bind(&job.error_message)
    .bind(&started_at)
    .bind(&ended_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one job
pub async fn load_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<ImportJob>> {
    let row = sqlx::query(&format!("{} WHERE job_id = ?", SELECT_COLUMNS))
        .bind(job_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Most recently started jobs first
pub async fn list_recent_jobs(pool: &SqlitePool, limit: u32) -> Result<Vec<ImportJob>> {
    let rows = sqlx::query(&format!(
        "{} ORDER BY started_at DESC LIMIT ?",
        SELECT_COLUMNS
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

fn job_from_row(row: &SqliteRow) -> Result<ImportJob> {
    let job_id: String = row.get("job_id");
    let job_id = Uuid::parse_str(&job_id)
        .map_err(|e| Error::Internal(format!("Invalid job_id '{}': {}", job_id, e)))?;

    let kind: String = row.get("kind");
    let kind: ImportKind = kind.parse().map_err(Error::Internal)?;

    let state: String = row.get("state");
    let state: JobState = serde_json::from_str(&state)
        .map_err(|e| Error::Internal(format!("Failed to deserialize state: {}", e)))?;

    let outcome: Option<String> = row.get("outcome");
    let outcome: Option<ImportOutcome> = outcome
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize outcome: {}", e)))?;

    let started_at: String = row.get("started_at");
    let started_at = parse_timestamp(&started_at, "started_at")?;

    let ended_at: Option<String> = row.get("ended_at");
    let ended_at = ended_at
        .map(|s| parse_timestamp(&s, "ended_at"))
        .transpose()?;

    Ok(ImportJob {
        job_id,
        kind,
        file_name: row.get("file_name"),
        state,
        progress: ImportProgress::new(
            row.get::<i64, _>("progress_processed") as usize,
            row.get::<i64, _>("progress_total") as usize,
        ),
        outcome,
        error_message: row.get("error_message"),
        started_at,
        ended_at,
    })
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowError;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_and_load_running_job() {
        let pool = test_pool().await;
        let job = ImportJob::new(ImportKind::Shifts, "turnos.csv".to_string());

        save_job(&pool, &job).await.unwrap();
        let loaded = load_job(&pool, job.job_id).await.unwrap().unwrap();

        assert_eq!(loaded.job_id, job.job_id);
        assert_eq!(loaded.kind, ImportKind::Shifts);
        assert_eq!(loaded.state, JobState::Running);
        assert!(loaded.outcome.is_none());
        assert!(loaded.ended_at.is_none());
    }

    #[tokio::test]
    async fn test_save_updates_existing_job() {
        let pool = test_pool().await;
        let mut job = ImportJob::new(ImportKind::Assignments, "asignaciones.csv".to_string());
        save_job(&pool, &job).await.unwrap();

        job.finish(ImportOutcome {
            total: 2,
            successful: 1,
            failed: 1,
            errors: vec![RowError {
                row: 3,
                message: "Datos inválidos".to_string(),
            }],
            cancelled: false,
        });
        save_job(&pool, &job).await.unwrap();

        let loaded = load_job(&pool, job.job_id).await.unwrap().unwrap();
        assert_eq!(loaded.state, JobState::Completed);
        assert_eq!(loaded.progress, ImportProgress::new(2, 2));
        assert_eq!(loaded.outcome, job.outcome);
        assert!(loaded.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_load_unknown_job() {
        let pool = test_pool().await;
        assert!(load_job(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_jobs_newest_first() {
        let pool = test_pool().await;
        let mut older = ImportJob::new(ImportKind::Shifts, "a.csv".to_string());
        older.started_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = ImportJob::new(ImportKind::Shifts, "b.csv".to_string());

        save_job(&pool, &older).await.unwrap();
        save_job(&pool, &newer).await.unwrap();

        let jobs = list_recent_jobs(&pool, 20).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].file_name, "b.csv");

        assert_eq!(list_recent_jobs(&pool, 1).await.unwrap().len(), 1);
    }
}
