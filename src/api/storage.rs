use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{self, NewFileRecord};
use crate::error::ApiError;
use crate::models::{
    DownloadUrlResponse, FileRecord, TransformRequest, TransformResponse, UploadUrlRequest,
    UploadUrlResponse, RAW_CATEGORY,
};
use crate::state::AppState;
use crate::storage::blob::BlobSigner;
use crate::storage::hierarchy::build_file_tree;

/// POST /storage/upload-url
///
/// The record is written before the URL is signed, so a client that never
/// uploads leaves a record pointing at an empty blob; listings tolerate
/// that. The reverse order could leave unreachable blobs.
pub async fn upload_url(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    if req.original_filename.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "original_filename is required".to_string(),
        ));
    }

    let file_uuid = Uuid::new_v4();
    let blob_name = BlobSigner::upload_blob_name(caller.user_id, file_uuid, &req.original_filename);

    db::create_file_record(
        &state.pool,
        &NewFileRecord {
            uuid: file_uuid,
            owner_id: caller.user_id,
            original_filename: req.original_filename,
            blob_name: blob_name.clone(),
            size: req.size,
            mime_type: req.mime_type,
            category: RAW_CATEGORY.to_string(),
            module_name: req.module_name,
            parent_uuid: None,
        },
    )
    .await?;

    let upload_url = state.blob.issue_upload_url(&blob_name)?;

    tracing::info!(%file_uuid, owner = %caller.user_id, "upload URL issued");
    Ok(Json(UploadUrlResponse {
        file_uuid,
        blob_name,
        upload_url,
    }))
}

/// GET /storage/download-url/{file_uuid}
pub async fn download_url(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(file_uuid): Path<Uuid>,
) -> Result<Json<DownloadUrlResponse>, ApiError> {
    let record = db::get_file_details(&state.pool, file_uuid)
        .await?
        .ok_or(ApiError::NotFound("file"))?;
    if record.owner_id != caller.user_id {
        return Err(ApiError::Forbidden("file belongs to another user"));
    }

    let download_url = state.blob.issue_download_url(&record.blob_name)?;
    Ok(Json(DownloadUrlResponse {
        file_uuid,
        blob_name: record.blob_name,
        download_url,
    }))
}

/// GET /storage/user-files — the caller's files as a RAW-rooted tree.
pub async fn user_files(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    let records = db::get_user_files(&state.pool, caller.user_id).await?;
    Ok(Json(build_file_tree(records)))
}

/// POST /storage/handle-transform
///
/// Registers a derived artifact under an existing file. Owner and module
/// name are inherited from the parent, never taken from the request.
pub async fn handle_transform(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<TransformRequest>,
) -> Result<Json<TransformResponse>, ApiError> {
    if req.category == RAW_CATEGORY {
        return Err(ApiError::BadRequest(
            "transform category cannot be RAW".to_string(),
        ));
    }

    let parent = db::get_file_details(&state.pool, req.parent_uuid)
        .await?
        .ok_or(ApiError::NotFound("parent file"))?;
    if parent.owner_id != caller.user_id {
        return Err(ApiError::Forbidden("parent file belongs to another user"));
    }

    let file_uuid = Uuid::new_v4();
    let blob_name = BlobSigner::transform_blob_name(parent.owner_id, file_uuid, &req.filename);

    db::create_file_record(
        &state.pool,
        &NewFileRecord {
            uuid: file_uuid,
            owner_id: parent.owner_id,
            original_filename: req.filename,
            blob_name: blob_name.clone(),
            size: req.size,
            mime_type: req.mime_type,
            category: req.category,
            module_name: parent.module_name,
            parent_uuid: Some(parent.uuid),
        },
    )
    .await?;

    tracing::info!(%file_uuid, parent = %parent.uuid, "transform registered");
    Ok(Json(TransformResponse {
        file_uuid,
        blob_name,
    }))
}
