//! Route definitions for the PawnVault API

mod auth;
mod customers;
mod loans;
mod repayments;
mod reports;

use axum::Router;

pub use auth::auth_routes;
pub use customers::customer_routes;
pub use loans::loan_routes;
pub use repayments::repayment_routes;
pub use reports::report_routes;

use crate::handlers;
use crate::state::AppState;

/// Full application router, shared between main and the test suite
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(handlers::root))
        .route("/health", axum::routing::get(handlers::health_check))
        .merge(auth_routes())
        .merge(customer_routes())
        .merge(loan_routes())
        .merge(repayment_routes())
        .merge(report_routes())
}
