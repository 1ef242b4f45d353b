//! HTTP request handlers

pub mod auth;
pub mod customers;
pub mod loans;
pub mod otp;
pub mod repayments;
pub mod reports;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /
pub async fn root() -> impl IntoResponse {
    "PawnVault API Server"
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "environment": state.environment.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
