pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::document::handlers as document;
use crate::generation::handlers as generation;
use crate::json_resume::handlers as json_resume;
use crate::settings::handlers as settings;
use crate::state::AppState;

/// Profile pictures are stored inline as data URLs.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Everything that edits the portfolio or spends AI credits sits behind the gate.
    let editor = Router::new()
        // Document API
        .route(
            "/api/v1/document",
            get(document::handle_get_document).put(document::handle_replace_document),
        )
        .route("/api/v1/document/fields", patch(document::handle_set_field))
        .route(
            "/api/v1/document/:section/items",
            post(document::handle_add_item),
        )
        .route(
            "/api/v1/document/:section/items/:index",
            patch(document::handle_update_item).delete(document::handle_remove_item),
        )
        .route("/api/v1/document/skills", post(document::handle_add_skill_group))
        .route(
            "/api/v1/document/skills/:title",
            delete(document::handle_remove_skill_group),
        )
        .route(
            "/api/v1/document/skills/:title/items",
            post(document::handle_add_skill),
        )
        .route(
            "/api/v1/document/skills/:title/items/:index",
            patch(document::handle_update_skill).delete(document::handle_remove_skill),
        )
        .route(
            "/api/v1/document/skills/:title/items/:index/highlight",
            post(document::handle_toggle_highlight),
        )
        .route(
            "/api/v1/document/profile-picture",
            put(document::handle_upload_profile_picture)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/document/preview", get(document::handle_preview))
        .route("/api/v1/document/import", post(json_resume::handle_import))
        // Settings API
        .route(
            "/api/v1/settings",
            get(settings::handle_get_settings)
                .put(settings::handle_update_settings)
                .delete(settings::handle_clear_settings),
        )
        .route("/api/v1/settings/test", post(settings::handle_test_connection))
        .route("/api/v1/settings/presets", get(settings::handle_presets))
        .route("/api/v1/settings/models", get(settings::handle_models))
        // Generation API
        .route(
            "/api/v1/generate/summary",
            post(generation::handle_generate_summary),
        )
        .route(
            "/api/v1/generate/cover-letter",
            post(generation::handle_generate_cover_letter),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/status", get(auth::handle_status))
        // Public export
        .route("/api/v1/resume.json", get(json_resume::handle_export))
        .merge(editor)
        .with_state(state)
}
