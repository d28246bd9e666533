// Persisted AI settings: provider, credentials, model and the last job
// description, plus the connection status shown next to the settings form.

pub mod handlers;
pub mod presets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::ai::{create_provider, ProviderConfig};
use crate::errors::AppError;
use crate::models::settings::{AiSettings, AiSettingsUpdate, ConnectionStatus, StoredCredentials};
use crate::store::{self, StoreError};

// ────────────────────────────────────────────────────────────────────────────
// Credentials file
// ────────────────────────────────────────────────────────────────────────────

/// Writes the credentials record according to the remember flag:
/// remembered settings are stored whole; otherwise only a non-empty job
/// description survives (with blank URL/key), and with none the file is removed.
pub async fn save_credentials(path: &Path, credentials: &StoredCredentials) -> Result<(), StoreError> {
    if credentials.remember_credentials {
        return store::write_json(path, credentials).await;
    }

    match credentials
        .last_job_description
        .as_deref()
        .filter(|jd| !jd.trim().is_empty())
    {
        Some(jd) => {
            let redacted = StoredCredentials {
                api_url: String::new(),
                api_key: String::new(),
                remember_credentials: false,
                last_job_description: Some(jd.to_string()),
                provider_type: None,
                model: None,
            };
            store::write_json(path, &redacted).await
        }
        None => store::remove(path).await,
    }
}

/// A missing or unreadable file yields `None`; corruption is logged, not fatal.
pub async fn load_credentials(path: &Path) -> Option<StoredCredentials> {
    match store::read_json(path).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Failed to load credentials: {e}");
            None
        }
    }
}

pub async fn clear_credentials(path: &Path) -> Result<(), StoreError> {
    store::remove(path).await
}

// ────────────────────────────────────────────────────────────────────────────
// Settings store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    #[serde(flatten)]
    pub settings: AiSettings,
    pub connection_status: ConnectionStatus,
    pub is_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Default)]
struct SettingsState {
    settings: AiSettings,
    status: ConnectionStatus,
}

impl SettingsState {
    fn view(&self) -> SettingsView {
        SettingsView {
            settings: self.settings.clone(),
            connection_status: self.status,
            is_configured: self.status == ConnectionStatus::Valid
                && !self.settings.job_description.trim().is_empty(),
        }
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<SettingsState>>,
    path: PathBuf,
}

impl SettingsStore {
    pub async fn open(path: PathBuf) -> Self {
        let settings = match load_credentials(&path).await {
            Some(stored) => {
                info!("Loaded AI settings from {}", path.display());
                AiSettings::from_stored(stored)
            }
            None => AiSettings::default(),
        };

        Self {
            inner: Arc::new(RwLock::new(SettingsState {
                settings,
                status: ConnectionStatus::Idle,
            })),
            path,
        }
    }

    pub async fn current(&self) -> AiSettings {
        self.inner.read().await.settings.clone()
    }

    pub async fn view(&self) -> SettingsView {
        self.inner.read().await.view()
    }

    /// Applies a partial update and persists it. Changing anything the
    /// connection depends on resets the status to `idle`.
    pub async fn update(&self, update: AiSettingsUpdate) -> Result<SettingsView, AppError> {
        let mut state = self.inner.write().await;
        let mut next = state.settings.clone();
        next.apply(update);

        save_credentials(&self.path, &StoredCredentials::from(&next)).await?;

        let connection_changed = next.provider_type != state.settings.provider_type
            || next.api_url != state.settings.api_url
            || next.api_key != state.settings.api_key
            || next.model != state.settings.model;
        if connection_changed {
            state.status = ConnectionStatus::Idle;
        }
        state.settings = next;
        Ok(state.view())
    }

    /// Forgets stored credentials and restores the defaults.
    pub async fn clear(&self) -> Result<SettingsView, AppError> {
        let mut state = self.inner.write().await;
        clear_credentials(&self.path).await?;
        *state = SettingsState::default();
        info!("AI settings cleared");
        Ok(state.view())
    }

    /// Blank URL or key fails fast; otherwise the provider's connection test
    /// decides between `valid` and `invalid`.
    pub async fn validate_connection(&self) -> ConnectionReport {
        let settings = {
            let mut state = self.inner.write().await;
            if state.settings.api_url.trim().is_empty() || state.settings.api_key.trim().is_empty() {
                state.status = ConnectionStatus::Invalid;
                return ConnectionReport {
                    status: ConnectionStatus::Invalid,
                    message: Some("API URL and API key are required".to_string()),
                };
            }
            state.status = ConnectionStatus::Testing;
            state.settings.clone()
        };

        let result = match create_provider(&ProviderConfig::from_settings(&settings)) {
            Ok(provider) => provider.test_connection().await,
            Err(e) => Err(e),
        };

        let report = match result {
            Ok(()) => ConnectionReport {
                status: ConnectionStatus::Valid,
                message: None,
            },
            Err(e) => {
                warn!("Connection test failed: {e}");
                ConnectionReport {
                    status: ConnectionStatus::Invalid,
                    message: Some(e.to_string()),
                }
            }
        };

        // Settings may have changed while the test ran; only record the
        // outcome if it still describes the current connection.
        let mut state = self.inner.write().await;
        if state.status == ConnectionStatus::Testing && state.settings == settings {
            state.status = report.status;
        }
        report
    }
}
