use crate::auth::{PasswordGate, SessionStore};
use crate::document::DocumentStore;
use crate::settings::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The portfolio document every editor form writes into.
    pub documents: DocumentStore,
    pub settings: SettingsStore,
    pub gate: PasswordGate,
    pub sessions: SessionStore,
}
