//! Report route definitions

use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports", axum::routing::get(reports::filtered_reports))
        .route("/api/reports/monthly", axum::routing::get(reports::monthly_report))
        .route("/api/reports/export", axum::routing::get(reports::export_reports))
}
