//! Passthrough endpoints onto the case-management platform.
//!
//! These proxy straight through the configured [`CaseClient`]; nothing is
//! written to the event store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use hrbridge_core::error::BridgeError;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /pega/case`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    /// Case type identifier in the case system.
    pub case_type: String,
    /// Initial case content.
    #[serde(default)]
    pub content: Value,
}

/// Request body for `POST /pega/case/{caseId}/note`.
#[derive(Debug, Deserialize)]
pub struct CaseNoteRequest {
    /// Note text.
    pub content: String,
}

/// POST /pega/case
#[instrument(skip(state, request))]
async fn create_case(
    State(state): State<AppState>,
    Json(request): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.case_type.trim().is_empty() {
        return Err(BridgeError::Validation("field 'caseType' is required".into()).into());
    }
    let created = state
        .case_client
        .create_case(&request.case_type, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /pega/case/{caseId}
#[instrument(skip(state))]
async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let case = state.case_client.get_case(&case_id).await?;
    Ok(Json(case))
}

/// PUT /pega/case/{caseId}
#[instrument(skip(state, content))]
async fn update_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(content): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let updated = state.case_client.update_case(&case_id, &content).await?;
    Ok(Json(updated))
}

/// POST /pega/case/{caseId}/note
#[instrument(skip(state, request))]
async fn add_case_note(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<CaseNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.content.trim().is_empty() {
        return Err(BridgeError::Validation("field 'content' is required".into()).into());
    }
    state
        .case_client
        .add_case_note(&case_id, &request.content)
        .await?;
    Ok(Json(json!({ "caseId": case_id, "noteAdded": true })))
}

/// POST /pega/case/{caseId}/action/{actionId}
#[instrument(skip(state, data))]
async fn execute_case_action(
    State(state): State<AppState>,
    Path((case_id, action_id)): Path<(String, String)>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state
        .case_client
        .execute_case_action(&case_id, &action_id, &data)
        .await?;
    Ok(Json(
        json!({ "caseId": case_id, "actionId": action_id, "executed": true }),
    ))
}

/// Returns the case-system passthrough router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pega/case", post(create_case))
        .route("/pega/case/{case_id}", get(get_case).put(update_case))
        .route("/pega/case/{case_id}/note", post(add_case_note))
        .route(
            "/pega/case/{case_id}/action/{action_id}",
            post(execute_case_action),
        )
}
