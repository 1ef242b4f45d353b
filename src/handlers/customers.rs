//! Customer handlers

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
use crate::models::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::state::AppState;

/// GET /api/customers
pub async fn list_customers(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let customers = state.customer_service.list_customers().await?;
    Ok(Json(json!({ "customers": customers })))
}

/// POST /api/customers
pub async fn create_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    let customer = state.customer_service.create_customer(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Customer created", "customer": customer })),
    ))
}

/// PUT /api/customers/:id
pub async fn update_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    let customer = state.customer_service.update_customer(id, payload).await?;
    Ok(Json(json!({ "message": "Customer updated", "customer": customer })))
}

/// DELETE /api/customers/:id
pub async fn delete_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.customer_service.delete_customer(id).await?;
    Ok(Json(json!({ "message": "Customer deleted" })))
}
