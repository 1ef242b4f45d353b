//! Loan handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::models::{CreateLoanRequest, UpdateLoanStatusRequest};
use crate::state::AppState;

/// GET /api/loans
pub async fn list_loans(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let loans = state.loan_service.list_loans().await?;
    Ok(Json(json!({ "loans": loans })))
}

/// GET /api/loans/:id
pub async fn get_loan(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let loan = state
        .loan_service
        .get_loan(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;
    Ok(Json(json!({ "loan": loan })))
}

/// POST /api/loans
pub async fn create_loan(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateLoanRequest>,
) -> ApiResult<impl IntoResponse> {
    let loan = state.loan_service.create_loan(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Loan created", "loan": loan })),
    ))
}

/// PATCH /api/loans/:id
pub async fn update_loan_status(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLoanStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let loan = state.loan_service.update_loan_status(id, payload).await?;
    Ok(Json(json!({ "message": "Loan updated", "loan": loan })))
}

/// PUT /api/loans/status
pub async fn sync_loan_statuses(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let loans = state.loan_service.sync_loan_statuses().await?;
    Ok(Json(json!({ "message": "Loan statuses synced", "loans": loans })))
}
