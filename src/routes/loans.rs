//! Loan route definitions

use axum::Router;

use crate::handlers::loans;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", axum::routing::get(loans::list_loans))
        .route("/api/loans", axum::routing::post(loans::create_loan))
        .route("/api/loans/status", axum::routing::put(loans::sync_loan_statuses))
        .route("/api/loans/:id", axum::routing::get(loans::get_loan))
        .route("/api/loans/:id", axum::routing::patch(loans::update_loan_status))
}
