//! Auth route definitions

use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", axum::routing::post(handlers::auth::register))
        .route("/auth/login", axum::routing::post(handlers::auth::login))
        .route("/auth/otp/request", axum::routing::post(handlers::otp::request_otp))
        .route("/auth/otp/verify", axum::routing::post(handlers::otp::verify_otp))
}
