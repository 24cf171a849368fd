// Handlers for the energy center fleet - listing, the transfer operation,
// and the audit trail.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::types::ApiError;
use super::AppState;
use crate::centers::{list_centers, EnergyCenter};
use crate::ledger::{list_transfers, Transfer};
use crate::transfer::{execute_transfer, TransferError, TransferOutcome, TransferRequest};

/// GET /centers - all centers with current fill levels
pub async fn get_centers(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnergyCenter>>, ApiError> {
    let conn = state.conn();
    let centers = list_centers(&conn)?;
    Ok(Json(centers))
}

/// POST /centers/transfer - move stored energy between two centers
///
/// A malformed body gets the same answer as a well-formed but invalid one.
pub async fn create_transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferOutcome>), ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::from(TransferError::InvalidPayload))?;

    let mut conn = state.conn();
    let outcome = execute_transfer(&mut conn, &request)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /centers/transfers - the append-only audit trail, newest first
pub async fn get_transfers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transfer>>, ApiError> {
    let conn = state.conn();
    let transfers = list_transfers(&conn)?;
    Ok(Json(transfers))
}
