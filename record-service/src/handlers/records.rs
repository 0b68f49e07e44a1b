//! Record CRUD endpoints.
//!
//! Listing and lookup report every store failure as 404; create and update
//! report store failures as 500 and malformed payloads as 400.

use crate::{
    dtos::records::{
        CreateRecordRequest, CreateRecordResponse, RecordListResponse, RecordLookupResponse,
        UpdateRecordRequest, UpdateRecordResponse,
    },
    utils::ValidatedJson,
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

/// List all records
#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "Every stored record", body = RecordListResponse),
        (status = 404, description = "Records could not be read", body = crate::dtos::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<RecordListResponse>, AppError> {
    let records = state
        .store
        .list_all()
        .await
        .map_err(|e| AppError::NotFound(anyhow::Error::new(e)))?;

    tracing::info!(count = records.len(), "Listed records");
    Ok(Json(RecordListResponse { records }))
}

/// Get a record by id
#[utoipa::path(
    get,
    path = "/records/{id}",
    params(("id" = String, Path, description = "24-character hex ObjectId")),
    responses(
        (status = 200, description = "The matching record", body = RecordLookupResponse),
        (status = 404, description = "No record with that id, or lookup failed", body = crate::dtos::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordLookupResponse>, AppError> {
    let record = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| AppError::NotFound(anyhow::Error::new(e)))?;

    tracing::info!(record_id = %id, "Fetched record");
    Ok(Json(RecordLookupResponse::from(record)))
}

/// Create a record
#[utoipa::path(
    put,
    path = "/records",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Record created", body = CreateRecordResponse),
        (status = 400, description = "Malformed body", body = crate::dtos::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::dtos::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn create_record(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRecordRequest>,
) -> Result<Json<CreateRecordResponse>, AppError> {
    if let Some(supplied) = req.id.as_deref() {
        tracing::debug!(supplied_id = %supplied, "Ignoring client-supplied id on create");
    }

    let id = state.store.create(req.into_record()).await?;
    Ok(Json(CreateRecordResponse { id: id.to_hex() }))
}

/// Replace a record, creating it if absent
#[utoipa::path(
    post,
    path = "/records/update",
    request_body = UpdateRecordRequest,
    responses(
        (status = 200, description = "Stored record", body = UpdateRecordResponse),
        (status = 400, description = "Malformed body or missing id", body = crate::dtos::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::dtos::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn update_record(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateRecordRequest>,
) -> Result<Json<UpdateRecordResponse>, AppError> {
    let record = state.store.update(req.into_record()?).await?;
    Ok(Json(UpdateRecordResponse { record }))
}
