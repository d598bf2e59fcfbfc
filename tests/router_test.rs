//! Route-matching tests over the assembled router. The state uses a lazy
//! pool, so no backend is contacted: an unauthenticated request proves a
//! route exists by failing authorization instead of matching nothing.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use clara_backend::api;
use clara_backend::config::Config;
use clara_backend::llm::LlmClient;
use clara_backend::search::HybridSearchClient;
use clara_backend::state::AppState;
use clara_backend::storage::blob::BlobSigner;

fn lazy_state() -> AppState {
    let config = Config::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    let http = reqwest::Client::new();
    AppState {
        search: Arc::new(HybridSearchClient::new(
            http.clone(),
            config.search.clone(),
            config.llm.clone(),
        )),
        llm: Arc::new(LlmClient::new(http, config.llm.clone())),
        blob: Arc::new(BlobSigner::new(config.blob.clone())),
        pool,
        config,
    }
}

async fn post_status(path: &str) -> StatusCode {
    let app = api::router(lazy_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_generation_routes_accept_both_slash_forms() {
    for path in [
        "/chat",
        "/chat/",
        "/exercises",
        "/exercises/",
        "/revision",
        "/revision/",
    ] {
        let status = post_status(path).await;
        assert_ne!(status, StatusCode::NOT_FOUND, "{path} should be routed");
    }
}

#[tokio::test]
async fn test_generation_routes_require_a_token() {
    assert_eq!(post_status("/chat/").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    assert_eq!(post_status("/nope").await, StatusCode::NOT_FOUND);
}
