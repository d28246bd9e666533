//! Axum route handlers for the Settings API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ai::{create_provider, ProviderConfig};
use crate::errors::AppError;
use crate::models::settings::AiSettingsUpdate;
use crate::settings::presets::{ProviderPreset, CUSTOM_PROVIDER, PROVIDER_PRESETS};
use crate::settings::{ConnectionReport, SettingsView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub presets: &'static [ProviderPreset],
    pub custom: &'static ProviderPreset,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    Json(state.settings.view().await)
}

/// PUT /api/v1/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(update): Json<AiSettingsUpdate>,
) -> Result<Json<SettingsView>, AppError> {
    Ok(Json(state.settings.update(update).await?))
}

/// DELETE /api/v1/settings
pub async fn handle_clear_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsView>, AppError> {
    Ok(Json(state.settings.clear().await?))
}

/// POST /api/v1/settings/test
pub async fn handle_test_connection(State(state): State<AppState>) -> Json<ConnectionReport> {
    Json(state.settings.validate_connection().await)
}

/// GET /api/v1/settings/presets
pub async fn handle_presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: PROVIDER_PRESETS,
        custom: &CUSTOM_PROVIDER,
    })
}

/// GET /api/v1/settings/models
///
/// Lists models for the configured provider, falling back to known defaults.
pub async fn handle_models(
    State(state): State<AppState>,
) -> Result<Json<ModelsResponse>, AppError> {
    let settings = state.settings.current().await;
    let provider = create_provider(&ProviderConfig::from_settings(&settings))?;
    Ok(Json(ModelsResponse {
        models: provider.fetch_models().await,
    }))
}
