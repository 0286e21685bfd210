//! Upload route: multipart scanner files in, per-file import outcomes out.

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::parsers::ReportFormat;
use crate::services::ingestion::{self, IngestSettings};
use crate::AppState;

/// Outcome for one uploaded file.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub file_name: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ReportFormat>,
    pub hosts: usize,
    pub issues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Error,
}

/// Summary of one upload request.
#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub upload_id: Uuid,
    pub project_id: String,
    pub tags: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileResult>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// POST /upload: import one or more scanner files (multipart: `pid`, `tags`, files).
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadSummary>>, AppError> {
    let started_at = Utc::now();
    let upload_id = Uuid::new_v4();
    let mut project_id = String::new();
    let mut tags = String::new();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if let Some(file_name) = field.file_name().map(String::from) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
            files.push((file_name, data.to_vec()));
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
        match name.as_str() {
            "pid" => project_id = text,
            "tags" => tags = text,
            _ => {}
        }
    }

    let settings = IngestSettings::new(&project_id, &tags);
    if settings.project_id.is_empty() {
        return Err(AppError::Validation("Missing 'pid' field".to_string()));
    }
    if files.is_empty() {
        return Err(AppError::Validation(
            "No files in multipart request".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(files.len());
    for (file_name, data) in files {
        let result =
            ingestion::process_file(state.importer.as_ref(), &data, &file_name, &settings).await;
        results.push(match result {
            Ok(summary) => {
                tracing::info!(%upload_id, file_name = %file_name, "Upload successful");
                FileResult {
                    file_name,
                    status: FileStatus::Success,
                    format: Some(summary.format),
                    hosts: summary.hosts,
                    issues: summary.issues,
                    message: None,
                }
            }
            Err(e) => {
                tracing::warn!(%upload_id, file_name = %file_name, error = %e, "Upload failed");
                FileResult {
                    file_name,
                    status: FileStatus::Error,
                    format: None,
                    hosts: 0,
                    issues: 0,
                    message: Some(e.to_string()),
                }
            }
        });
    }

    let succeeded = results
        .iter()
        .filter(|r| r.status == FileStatus::Success)
        .count();

    Ok(ApiResponse::success(UploadSummary {
        upload_id,
        project_id: settings.project_id,
        tags: settings.tags,
        succeeded,
        failed: results.len() - succeeded,
        files: results,
        started_at,
        completed_at: Utc::now(),
    }))
}
