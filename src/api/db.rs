use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthUser;
use crate::db::{self, EnrollmentOutcome};
use crate::error::ApiError;
use crate::models::{
    ClassCreateRequest, ClassCreateResponse, ClassListResponse, ClassesQuery,
    EnrollmentCreateRequest, EnrollmentCreateResponse, EnrollmentListResponse, EnrollmentsQuery,
    Module, ModuleCreateRequest, ModuleCreateResponse, ModuleListResponse, UserSummary,
};
use crate::state::AppState;

/// GET /db/ping — connectivity probe. Store errors surface verbatim here;
/// this is a debug path.
pub async fn ping(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    db::ping(&state.pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// GET /db/users — debug listing, password hashes omitted.
pub async fn list_users(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = db::list_users(&state.pool).await?;
    Ok(Json(users))
}

// ─── Modules ─────────────────────────────────────────────

/// POST /db/modules — create a module owned by the caller.
pub async fn create_module(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<ModuleCreateRequest>,
) -> Result<Json<ModuleCreateResponse>, ApiError> {
    if req.module_name.trim().is_empty() {
        return Err(ApiError::BadRequest("module_name is required".to_string()));
    }

    let module_id = db::create_module(&state.pool, &req.module_name, caller.user_id).await?;
    Ok(Json(ModuleCreateResponse {
        module_id,
        module_name: req.module_name,
        success: true,
    }))
}

/// GET /db/modules — the caller's own modules, nobody else's.
pub async fn list_modules(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ModuleListResponse>, ApiError> {
    let modules = db::get_modules_by_creator(&state.pool, caller.user_id).await?;
    let count = modules.len();
    Ok(Json(ModuleListResponse { modules, count }))
}

/// GET /db/modules/{module_id}
pub async fn get_module(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(module_id): Path<i32>,
) -> Result<Json<Module>, ApiError> {
    let module = db::get_module_by_id(&state.pool, module_id)
        .await?
        .ok_or(ApiError::NotFound("module"))?;
    Ok(Json(module))
}

// ─── Classes ─────────────────────────────────────────────

/// POST /db/classes — only for the teacher creating their own class.
pub async fn create_class(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<ClassCreateRequest>,
) -> Result<Json<ClassCreateResponse>, ApiError> {
    if req.teacher_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "a class can only be created by its own teacher",
        ));
    }
    if db::get_module_by_id(&state.pool, req.module_id).await?.is_none() {
        return Err(ApiError::NotFound("module"));
    }

    let class_id = db::create_class(
        &state.pool,
        &req.class_name,
        req.teacher_id,
        &req.enrollment_code,
        req.module_id,
    )
    .await?;

    Ok(Json(ClassCreateResponse {
        class_id,
        class_name: req.class_name,
        enrollment_code: req.enrollment_code,
    }))
}

/// GET /db/classes — two lookup modes, selected by query parameter.
///
/// `teacher_id` lists that teacher's classes (callers may only list their
/// own); `enrollment_code` resolves a code to its class so a student can
/// confirm what they are joining.
pub async fn list_classes(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<ClassesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match (query.teacher_id, query.enrollment_code) {
        (Some(teacher_id), _) => {
            if teacher_id != caller.user_id {
                return Err(ApiError::Forbidden(
                    "classes can only be listed by their own teacher",
                ));
            }
            let classes = db::get_classes_by_teacher(&state.pool, teacher_id).await?;
            let count = classes.len();
            let body = ClassListResponse { classes, count };
            Ok(Json(serde_json::to_value(body).map_err(|e| {
                ApiError::Upstream(e.to_string())
            })?))
        }
        (None, Some(code)) => {
            let class = db::get_class_by_enrollment_code(&state.pool, &code)
                .await?
                .ok_or(ApiError::NotFound("class"))?;
            Ok(Json(serde_json::to_value(class).map_err(|e| {
                ApiError::Upstream(e.to_string())
            })?))
        }
        (None, None) => Err(ApiError::BadRequest(
            "either teacher_id or enrollment_code is required".to_string(),
        )),
    }
}

// ─── Enrollments ─────────────────────────────────────────

/// POST /db/enrollments — a student enrolls themself with a class code.
pub async fn create_enrollment(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<EnrollmentCreateRequest>,
) -> Result<Json<EnrollmentCreateResponse>, ApiError> {
    if req.student_id != caller.user_id {
        return Err(ApiError::Forbidden("students can only enroll themselves"));
    }

    let outcome = db::create_enrollment(
        &state.pool,
        req.class_id,
        req.student_id,
        &req.enrollment_code,
    )
    .await?;

    match outcome {
        EnrollmentOutcome::Created(enrollment_id) => Ok(Json(EnrollmentCreateResponse {
            enrollment_id,
            class_id: req.class_id,
            student_id: req.student_id,
        })),
        EnrollmentOutcome::AlreadyEnrolled => Err(ApiError::Conflict(
            "student is already enrolled in this class".to_string(),
        )),
        EnrollmentOutcome::WrongCode => Err(ApiError::WrongEnrollmentCode),
        EnrollmentOutcome::ClassMissing => Err(ApiError::NotFound("class")),
    }
}

/// GET /db/enrollments — a student's own enrollments.
pub async fn list_enrollments(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<EnrollmentsQuery>,
) -> Result<Json<EnrollmentListResponse>, ApiError> {
    if query.student_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "enrollments can only be listed by their own student",
        ));
    }
    let enrollments = db::get_enrollments_by_student(&state.pool, query.student_id).await?;
    let count = enrollments.len();
    Ok(Json(EnrollmentListResponse { enrollments, count }))
}
