//! Registration and login handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .auth_service
        .register(payload)
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created successfully",
            "token": result.token,
            "user": result.user,
        })),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .auth_service
        .login(payload)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": result.token,
        "user": result.user,
    })))
}
