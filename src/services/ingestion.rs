//! Per-file ingestion: detect the report format, build the unified project,
//! and hand it to the importer.
//!
//! Each file is an independent unit of work. Any failure abandons that file
//! only; callers decide whether to continue with the rest of a batch.

use serde::Serialize;

use crate::builders::ProjectBuilder;
use crate::errors::AppError;
use crate::models::Project;
use crate::parsers::{self, ReportFormat};
use crate::services::importer::ProjectImporter;

/// Caller-supplied settings applied to every file in an upload.
#[derive(Debug, Clone, Default)]
pub struct IngestSettings {
    pub project_id: String,
    pub tags: Vec<String>,
}

impl IngestSettings {
    /// Split a comma-separated tag list; an empty string means no tags.
    pub fn new(project_id: &str, tags: &str) -> Self {
        let tags = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Self {
            project_id: project_id.trim().to_string(),
            tags,
        }
    }
}

/// Summary of a successfully imported file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportSummary {
    pub format: ReportFormat,
    pub hosts: usize,
    pub issues: usize,
    pub commands: usize,
}

/// Detect and build without importing.
pub fn normalize(data: &[u8], settings: &IngestSettings) -> Result<(ReportFormat, Project), AppError> {
    let report = parsers::detect(data)?;
    let format = report.format();
    let project = report.build(&settings.project_id, &settings.tags)?;
    Ok((format, project))
}

/// Run one file through detection, building, and import.
pub async fn process_file(
    importer: &dyn ProjectImporter,
    data: &[u8],
    file_name: &str,
    settings: &IngestSettings,
) -> Result<ImportSummary, AppError> {
    let (format, project) = normalize(data, settings)?;
    tracing::info!(
        file_name,
        %format,
        project_id = %project.id,
        hosts = project.hosts.len(),
        issues = project.issues.len(),
        "Normalized scanner output"
    );

    importer.import(&project).await?;

    Ok(ImportSummary {
        format,
        hosts: project.hosts.len(),
        issues: project.issues.len(),
        commands: project.commands.len(),
    })
}
