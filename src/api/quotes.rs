// Handler for connection quotes.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::types::ApiError;
use super::AppState;
use crate::centers::list_centers;
use crate::quote::{connection_quote, ConnectionQuote};

#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    #[serde(default, rename = "type")]
    pub consumer_type: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// GET /quotes/connection?type=Industry&city=Delhi
///
/// The consumer type is optional and defaults to the household rate; the
/// city is required.
pub async fn get_connection_quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<ConnectionQuote>, ApiError> {
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required fields"))?;
    let consumer_type = params.consumer_type.as_deref().unwrap_or("Household");

    let conn = state.conn();
    let centers = list_centers(&conn)?;

    let quote = connection_quote(consumer_type, city, &centers)
        .ok_or_else(|| ApiError::not_found("No energy centers available"))?;
    Ok(Json(quote))
}
