//! Repayment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::models::CreateRepaymentRequest;
use crate::state::AppState;

/// POST /api/repayments
pub async fn create_repayment(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRepaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let (repayment, loan) = state.loan_service.record_repayment(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Repayment recorded",
            "repayment": repayment,
            "loan": loan,
        })),
    ))
}

/// GET /api/repayments/:loan_id
pub async fn list_repayments(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(loan_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let repayments = state.loan_service.list_repayments_by_loan(loan_id).await?;
    Ok(Json(json!({ "repayments": repayments })))
}
