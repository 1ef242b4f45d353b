//! Customer route definitions

use axum::Router;

use crate::handlers::customers;
use crate::state::AppState;

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/customers", axum::routing::get(customers::list_customers))
        .route("/api/customers", axum::routing::post(customers::create_customer))
        .route("/api/customers/:id", axum::routing::put(customers::update_customer))
        .route("/api/customers/:id", axum::routing::delete(customers::delete_customer))
}
