// Handlers for the consumer registry.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::types::ApiError;
use super::AppState;
use crate::consumers::{Consumer, ConsumerUsageUpdate, NewConsumer};

/// GET /consumers - registered consumers, newest first
pub async fn get_consumers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Consumer>>, ApiError> {
    let conn = state.conn();
    let consumers = crate::consumers::list_consumers(&conn)?;
    Ok(Json(consumers))
}

/// POST /consumers - register a consumer
pub async fn create_consumer(
    State(state): State<AppState>,
    payload: Result<Json<NewConsumer>, JsonRejection>,
) -> Result<(StatusCode, Json<Consumer>), ApiError> {
    let Json(new) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let consumer = new
        .into_consumer()
        .ok_or_else(|| ApiError::bad_request("Missing required fields"))?;

    let conn = state.conn();
    crate::consumers::insert_consumer(&conn, &consumer)?;
    Ok((StatusCode::CREATED, Json(consumer)))
}

/// PUT /consumers/:id - update monthly usage and bill
pub async fn update_consumer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ConsumerUsageUpdate>, JsonRejection>,
) -> Result<Json<Consumer>, ApiError> {
    let Json(update) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    let conn = state.conn();
    let updated = crate::consumers::update_consumer_usage(&conn, &id, &update)?
        .ok_or_else(|| ApiError::not_found("Consumer not found"))?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use crate::api::{router, test_state};

    use super::*;

    fn post_consumer(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/consumers")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const VALID: &str = r#"{
        "name": "Asha Rao",
        "type": "Household",
        "city": "Delhi",
        "address": "12 Ring Road",
        "center_id": "EC001",
        "price_per_unit": 6.5,
        "connection_cost": 5000
    }"#;

    #[tokio::test]
    async fn register_then_list_round_trips() {
        let state = test_state();

        let resp = router(state.clone()).oneshot(post_consumer(VALID)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["name"], "Asha Rao");
        assert_eq!(created["type"], "Household");
        assert_eq!(created["monthly_usage"], 0.0);
        let id = created["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/consumers")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn registration_without_required_fields_is_rejected() {
        let app = router(test_state());

        let resp = app
            .oneshot(post_consumer(r#"{"name":"Asha Rao","type":"Household"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn usage_update_round_trips() {
        let state = test_state();

        let resp = router(state.clone()).oneshot(post_consumer(VALID)).await.unwrap();
        let id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .method("PUT")
            .uri(format!("/consumers/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"monthly_usage":320,"monthly_bill":2080}"#))
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["monthly_usage"], 320.0);
        assert_eq!(json["monthly_bill"], 2080.0);
        assert_eq!(json["name"], "Asha Rao");
    }

    #[tokio::test]
    async fn updating_an_unknown_consumer_is_404() {
        let app = router(test_state());

        let req = Request::builder()
            .method("PUT")
            .uri("/consumers/does-not-exist")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"monthly_usage":10}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Consumer not found");
    }
}
