// Handlers for the producer registry.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::types::ApiError;
use super::AppState;
use crate::producers::{NewProducer, Producer, ProducerUpdate};

/// GET /producers - registered producers, newest first
pub async fn get_producers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Producer>>, ApiError> {
    let conn = state.conn();
    let producers = crate::producers::list_producers(&conn)?;
    Ok(Json(producers))
}

/// POST /producers - register a producer
pub async fn create_producer(
    State(state): State<AppState>,
    payload: Result<Json<NewProducer>, JsonRejection>,
) -> Result<(StatusCode, Json<Producer>), ApiError> {
    let Json(new) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let producer = new
        .into_producer()
        .ok_or_else(|| ApiError::bad_request("Missing required fields"))?;

    let conn = state.conn();
    crate::producers::insert_producer(&conn, &producer)?;
    Ok((StatusCode::CREATED, Json(producer)))
}

/// PUT /producers/:id - partial update of listing and earnings fields
pub async fn update_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProducerUpdate>, JsonRejection>,
) -> Result<Json<Producer>, ApiError> {
    let Json(update) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    let conn = state.conn();
    let updated = crate::producers::update_producer(&conn, &id, &update)?
        .ok_or_else(|| ApiError::not_found("Producer not found"))?;
    Ok(Json(updated))
}
