use axum::extract::State;
use axum::Json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{
    ChatRequest, ChatResponse, Exercise, ExercisesRequest, RevisionRequest, RevisionSheet,
    SearchOutcome,
};
use crate::state::AppState;

/// Join retrieved chunk contents into one context block. Order follows the
/// backend ranking; chunks are concatenated without separators, matching
/// how the prompt delimits the whole block rather than each chunk.
fn context_from(outcome: &SearchOutcome) -> String {
    outcome
        .results
        .iter()
        .filter_map(|r| r.content.as_deref())
        .collect::<String>()
}

/// POST /chat — retrieval-grounded plain-text answer.
pub async fn chat(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is required".to_string()));
    }

    // ── Step 1: retrieve context ──
    let outcome = state.search.search(&req.query, None).await?;
    let context = context_from(&outcome);

    // ── Step 2: generate the answer ──
    let answer = state.llm.chat(&req.query, &context).await?;

    Ok(Json(ChatResponse { answer }))
}

/// POST /exercises — multiple-choice questions grounded in retrieved content.
pub async fn exercises(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(req): Json<ExercisesRequest>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is required".to_string()));
    }
    if req.n_questions == 0 {
        return Err(ApiError::BadRequest(
            "n_questions must be at least 1".to_string(),
        ));
    }

    let outcome = state.search.search(&req.query, None).await?;
    let context = context_from(&outcome);

    let exercises = state
        .llm
        .generate_exercises(&req.query, &context, req.n_questions)
        .await?;

    Ok(Json(exercises))
}

/// POST /revision — revision sheets grounded in retrieved content.
pub async fn revision(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(req): Json<RevisionRequest>,
) -> Result<Json<Vec<RevisionSheet>>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is required".to_string()));
    }

    let outcome = state.search.search(&req.query, None).await?;
    let context = context_from(&outcome);

    let sheets = state
        .llm
        .generate_revision_sheets(&req.query, &context)
        .await?;

    Ok(Json(sheets))
}
