use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::error::AppError;

use crate::services::directory::OfficeDirectory;

fn map_store_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound(msg) => AppError::NotFound(msg),
        StoreError::Unavailable(msg) => AppError::Store(msg),
        other => AppError::Internal(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn list_offices(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let directory = OfficeDirectory::new(&state);
    let offices = directory.list_offices().await.map_err(map_store_error)?;

    Ok(Json(json!({ "offices": offices })))
}

#[axum::debug_handler]
pub async fn get_office(
    State(state): State<Arc<AppConfig>>,
    Path(office_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let directory = OfficeDirectory::new(&state);
    let office = directory.get_office(office_id).await.map_err(map_store_error)?;

    Ok(Json(json!(office)))
}
