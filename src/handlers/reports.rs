//! Report handlers
//!
//! JSON report endpoints plus a CSV download of the same rows. The export
//! keeps the snake_case column contract of the report rows.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::models::{LoanReportRow, ReportKind, ReportQuery};
use crate::state::AppState;

/// GET /api/reports/monthly
pub async fn monthly_report(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let report = state.loan_service.monthly_report().await?;
    Ok(Json(json!({ "report": report })))
}

/// GET /api/reports?type=daily|monthly|yearly
pub async fn filtered_reports(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let kind = query.kind.unwrap_or(ReportKind::Monthly);
    let reports = state.loan_service.filtered_reports(kind).await?;
    Ok(Json(json!({ "reports": reports })))
}

/// GET /api/reports/export?type=daily|monthly|yearly
pub async fn export_reports(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let kind = query.kind.unwrap_or(ReportKind::Monthly);
    let rows = state.loan_service.filtered_reports(kind).await?;
    let csv = render_csv(&rows);

    Ok((
        [
            ("Content-Type", "text/csv".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=report-{}.csv", kind.as_str()),
            ),
        ],
        csv,
    ))
}

fn render_csv(rows: &[LoanReportRow]) -> String {
    let mut out = String::from(
        "customer_id,loan_id,start_date,name,phone,item,amount,due_date,interest_amount,total_amount\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            row.customer_id,
            row.loan_id,
            csv_field(&row.start_date),
            csv_field(&row.name),
            csv_field(&row.phone),
            csv_field(&row.item),
            row.amount,
            csv_field(&row.due_date),
            row.interest_amount,
            row.total_amount,
        ));
    }
    out
}

/// Quote a field when it contains a comma, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
