//! HTTP handlers, grouped by surface.

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod db;
pub mod rag;
pub mod storage;

/// Assemble the full route table over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Credentials
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Record store
        .route("/db/ping", get(db::ping))
        .route("/db/users", get(db::list_users))
        .route("/db/modules", post(db::create_module))
        .route("/db/modules", get(db::list_modules))
        .route("/db/modules/{module_id}", get(db::get_module))
        .route("/db/classes", post(db::create_class))
        .route("/db/classes", get(db::list_classes))
        .route("/db/enrollments", post(db::create_enrollment))
        .route("/db/enrollments", get(db::list_enrollments))
        // Blob storage
        .route("/storage/upload-url", post(storage::upload_url))
        .route("/storage/download-url/{file_uuid}", get(storage::download_url))
        .route("/storage/user-files", get(storage::user_files))
        .route("/storage/handle-transform", post(storage::handle_transform))
        // Generation; existing clients address these with a trailing slash,
        // so both forms are registered
        .route("/chat", post(rag::chat))
        .route("/chat/", post(rag::chat))
        .route("/exercises", post(rag::exercises))
        .route("/exercises/", post(rag::exercises))
        .route("/revision", post(rag::revision))
        .route("/revision/", post(rag::revision))
        .with_state(state)
}
