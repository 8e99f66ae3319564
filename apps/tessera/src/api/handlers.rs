//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. All endpoints
//! are read-only; each request runs its own reconstruction pass.

use super::{
    AppState,
    types::{
        HealthResponse, InstanceResponse, StatusResponse, StorageListResponse, StorageResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tessera_core::{StorageSummary, TesseraError};

/// HTTP status for a failed reconstruction.
///
/// Malformed source data is a 422; everything else is a source failure.
pub fn error_status(error: &TesseraError) -> StatusCode {
    match error {
        TesseraError::MalformedRecord { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TesseraError::InvalidRecord(_) | TesseraError::ConfigError(_) => StatusCode::BAD_REQUEST,
        TesseraError::SerializationError(_)
        | TesseraError::DeserializationError(_)
        | TesseraError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Reconstruct every storage and report counts.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.navigator.retrieve_storages() {
        Ok(storages) => {
            let summaries = storages.iter().map(StorageSummary::from_storage).collect();
            (StatusCode::OK, Json(StatusResponse::from_summaries(summaries)))
        }
        Err(e) => {
            tracing::warn!("status failed: {}", e);
            (error_status(&e), Json(StatusResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// STORAGE HANDLERS
// =============================================================================

/// List storage names.
pub async fn list_storages_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.navigator.list_storage_names() {
        Ok(names) => (StatusCode::OK, Json(StorageListResponse::success(names))),
        Err(e) => (error_status(&e), Json(StorageListResponse::error(e.to_string()))),
    }
}

/// Reconstruct one storage.
pub async fn storage_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.navigator.retrieve_storage(&name) {
        Ok(Some(storage)) => (StatusCode::OK, Json(StorageResponse::success(&storage))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(StorageResponse::error(format!("Storage not found: {}", name))),
        ),
        Err(e) => {
            tracing::warn!(storage = %name, "reconstruction failed: {}", e);
            (error_status(&e), Json(StorageResponse::error(e.to_string())))
        }
    }
}

/// Single-record view of one instance.
pub async fn instance_handler(
    State(state): State<AppState>,
    Path((storage, label)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.navigator.retrieve_instance(&label, &storage) {
        Ok(Some(instance)) => (StatusCode::OK, Json(InstanceResponse::success(&instance))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(InstanceResponse::error(format!(
                "Instance not found: {} in {}",
                label, storage
            ))),
        ),
        Err(e) => (error_status(&e), Json(InstanceResponse::error(e.to_string()))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
