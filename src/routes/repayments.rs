//! Repayment route definitions

use axum::Router;

use crate::handlers::repayments;
use crate::state::AppState;

pub fn repayment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/repayments", axum::routing::post(repayments::create_repayment))
        .route("/api/repayments/:loan_id", axum::routing::get(repayments::list_repayments))
}
