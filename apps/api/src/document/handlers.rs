//! Axum route handlers for the Document API.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::document::editor::{self, ListSection};
use crate::document::preview::{self, PreviewKind};
use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// One form input change. `field` is ignored for string-list items.
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    #[serde(default)]
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SkillGroupRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillTextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub kind: PreviewKind,
}

// ────────────────────────────────────────────────────────────────────────────
// Whole document
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<ResumeData> {
    Json(state.documents.snapshot().await)
}

/// PUT /api/v1/document
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Json(document): Json<ResumeData>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state.documents.replace(document).await?;
    info!("Document replaced");
    Ok(Json(doc))
}

/// PATCH /api/v1/document/fields
pub async fn handle_set_field(
    State(state): State<AppState>,
    Json(request): Json<FieldUpdate>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::set_field(doc, &request.field, &request.value))
        .await?;
    Ok(Json(doc))
}

// ────────────────────────────────────────────────────────────────────────────
// List sections
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/document/:section/items
pub async fn handle_add_item(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<ResumeData>, AppError> {
    let section = ListSection::parse(&section)?;
    let doc = state
        .documents
        .update(|doc| {
            match section {
                ListSection::Objects(s) => editor::add_item(doc, s),
                ListSection::Strings(l) => editor::add_string(doc, l),
            }
            Ok(())
        })
        .await?;
    Ok(Json(doc))
}

/// PATCH /api/v1/document/:section/items/:index
pub async fn handle_update_item(
    State(state): State<AppState>,
    Path((section, index)): Path<(String, usize)>,
    Json(request): Json<FieldUpdate>,
) -> Result<Json<ResumeData>, AppError> {
    let section = ListSection::parse(&section)?;
    let doc = state
        .documents
        .update(|doc| match section {
            ListSection::Objects(s) => {
                editor::update_item(doc, s, index, &request.field, &request.value)
            }
            ListSection::Strings(l) => {
                let text = request.value.as_str().ok_or_else(|| {
                    AppError::Validation("List entries expect a string value".to_string())
                })?;
                editor::update_string(doc, l, index, text.to_string())
            }
        })
        .await?;
    Ok(Json(doc))
}

/// DELETE /api/v1/document/:section/items/:index
pub async fn handle_remove_item(
    State(state): State<AppState>,
    Path((section, index)): Path<(String, usize)>,
) -> Result<Json<ResumeData>, AppError> {
    let section = ListSection::parse(&section)?;
    let doc = state
        .documents
        .update(|doc| match section {
            ListSection::Objects(s) => editor::remove_item(doc, s, index),
            ListSection::Strings(l) => editor::remove_string(doc, l, index),
        })
        .await?;
    Ok(Json(doc))
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/document/skills
pub async fn handle_add_skill_group(
    State(state): State<AppState>,
    Json(request): Json<SkillGroupRequest>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::add_skill_group(doc, &request.title))
        .await?;
    Ok(Json(doc))
}

/// DELETE /api/v1/document/skills/:title
pub async fn handle_remove_skill_group(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::remove_skill_group(doc, &title))
        .await?;
    Ok(Json(doc))
}

/// POST /api/v1/document/skills/:title/items
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::add_skill(doc, &title))
        .await?;
    Ok(Json(doc))
}

/// PATCH /api/v1/document/skills/:title/items/:index
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path((title, index)): Path<(String, usize)>,
    Json(request): Json<SkillTextRequest>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::update_skill(doc, &title, index, request.text))
        .await?;
    Ok(Json(doc))
}

/// POST /api/v1/document/skills/:title/items/:index/highlight
pub async fn handle_toggle_highlight(
    State(state): State<AppState>,
    Path((title, index)): Path<(String, usize)>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::toggle_highlight(doc, &title, index))
        .await?;
    Ok(Json(doc))
}

/// DELETE /api/v1/document/skills/:title/items/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path((title, index)): Path<(String, usize)>,
) -> Result<Json<ResumeData>, AppError> {
    let doc = state
        .documents
        .update(|doc| editor::remove_skill(doc, &title, index))
        .await?;
    Ok(Json(doc))
}

// ────────────────────────────────────────────────────────────────────────────
// Profile picture and preview
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/document/profile-picture
///
/// Accepts multipart/form-data with a single image field named `file`.
pub async fn handle_upload_profile_picture(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeData>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((mime, bytes.to_vec()));
        }
    }

    let (mime, bytes) = upload
        .ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;

    let doc = state
        .documents
        .update(|doc| editor::set_profile_picture(doc, &mime, &bytes))
        .await?;
    info!("Profile picture updated ({mime}, {} bytes)", bytes.len());
    Ok(Json(doc))
}

/// GET /api/v1/document/preview?kind=resume|cover-letter
pub async fn handle_preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> String {
    preview::render(&state.documents.snapshot().await, query.kind)
}
