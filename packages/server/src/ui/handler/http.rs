//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{
        CredentialsRequest, LoginResponse, MessageResponse, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{AccountError, LoginUseCase, RegisterAccountUseCase},
};

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccountError::MissingFields
            | AccountError::InvalidUsername(_)
            | AccountError::DuplicateUsername(_) => StatusCode::BAD_REQUEST,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Internal(e) => {
                tracing::error!("Account request failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match self {
            AccountError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

/// Malformed or missing JSON bodies are treated as missing fields.
fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, AccountError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::warn!("Rejected credentials payload: {}", rejection);
            Err(AccountError::MissingFields)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Known rooms with their current member count, default room first
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state
        .sessions
        .room_summaries()
        .await
        .into_iter()
        .map(|(name, members)| RoomSummaryDto { name, members })
        .collect();
    Json(rooms)
}

/// `POST /api/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AccountError> {
    let body = credentials(payload)?;
    let username = RegisterAccountUseCase::new(state.accounts.clone())
        .execute(&body.username, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("User {username} registered successfully"),
        }),
    ))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AccountError> {
    let body = credentials(payload)?;
    let username = LoginUseCase::new(state.accounts.clone())
        .execute(&body.username, &body.password)
        .await?;

    tracing::info!("'{}' logged in", username);
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        username: username.into_string(),
    }))
}
