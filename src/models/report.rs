//! Reporting types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate metrics over the full enriched loan set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub total_loans: usize,
    pub total_principal: f64,
    pub total_payable: f64,
    pub total_repaid: f64,
    pub total_interest_earned: f64,
    pub pending_loans: usize,
    pub active_loans: usize,
    pub redeemed_loans: usize,
}

/// Reporting window anchored at the current day, month or year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Monthly,
    Yearly,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Monthly => "monthly",
            ReportKind::Yearly => "yearly",
        }
    }
}

/// Query parameters for the report endpoints
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub kind: Option<ReportKind>,
}

/// One flat row per loan, shaped for tabular export.
///
/// Row keys stay snake_case; this is the export column contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanReportRow {
    pub customer_id: Uuid,
    pub loan_id: Uuid,
    pub start_date: String,
    pub name: String,
    pub phone: String,
    pub item: String,
    pub amount: f64,
    pub due_date: String,
    pub interest_amount: f64,
    pub total_amount: f64,
}
