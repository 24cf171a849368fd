// Handler for the VoltAI chat relay.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::types::ApiError;
use super::AppState;
use crate::assistant::{system_instruction, ChatTurn};

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /assistant/chat - one conversation turn
///
/// Snapshots the marketplace, builds the grounded persona prompt, and
/// relays the conversation upstream. Unavailable (503) when the server
/// has no API key.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    let client = state
        .assistant()
        .ok_or_else(|| ApiError::service_unavailable("Assistant is not configured"))?;

    // The store lock is released before the upstream await.
    let prompt = {
        let conn = state.conn();
        let centers = crate::centers::list_centers(&conn)?;
        let consumers = crate::consumers::list_consumers(&conn)?;
        let producers = crate::producers::list_producers(&conn)?;
        system_instruction(&centers, &consumers, &producers).map_err(|err| {
            error!(error = %err, "failed to build the assistant prompt");
            ApiError::internal("Failed to build assistant prompt")
        })?
    };

    let reply = client
        .chat(&prompt, &request.history, message)
        .await
        .map_err(|err| {
            warn!(error = %err, "assistant upstream request failed");
            ApiError::bad_gateway("Assistant request failed")
        })?;

    Ok(Json(ChatResponse { reply }))
}
