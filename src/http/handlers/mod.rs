//! HTTP API handlers organized by resource.

mod files;
mod folders;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use chrono::Utc;

use super::AppError;
use super::types::HealthResponse;

pub(super) use files::{
    delete_file, list_all_files, list_all_images, list_files, rename_file, upload_file,
};
pub(super) use folders::{create_folder, delete_folder, list_folders, rename_folder};

/// GET /health - Liveness check.
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|e| {
        let message = format!("Invalid request body: {}", e.body_text());
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::BadRequest(message)
        }
    })
}

fn query<T>(query: Result<axum::extract::Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|axum::extract::Query(value)| value)
        .map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))
}
