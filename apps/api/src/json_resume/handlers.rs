//! Axum route handlers for JSON Resume backup and restore.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::json_resume::{convert, parse_import};
use crate::models::resume::ResumeData;
use crate::state::AppState;

/// GET /api/v1/resume.json
///
/// Exports the current document as a JSON Resume file download.
pub async fn handle_export(State(state): State<AppState>) -> impl IntoResponse {
    let resume = convert::export(&state.documents.snapshot().await);
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"resume.json\"",
        )],
        Json(resume),
    )
}

/// POST /api/v1/document/import
///
/// Replaces the document with an uploaded JSON Resume file. The cover letter
/// body and calendar link have no JSON Resume counterpart and are kept.
pub async fn handle_import(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResumeData>, AppError> {
    let imported = parse_import(&body)?;

    let doc = state
        .documents
        .update(move |doc| {
            let content = std::mem::take(&mut doc.content);
            let calendar_link = std::mem::take(&mut doc.calendar_link);
            *doc = ResumeData {
                content,
                calendar_link,
                ..imported
            };
            Ok(())
        })
        .await?;

    info!(
        "Imported JSON Resume for '{}' ({} jobs, {} skill groups)",
        doc.name,
        doc.work_experience.len(),
        doc.skills.len()
    );
    Ok(Json(doc))
}
