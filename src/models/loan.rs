//! Loan models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::CustomerSummary;

/// Loan lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "loan_status", rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Active,
    Late,
    Redeemed,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Late => "LATE",
            LoanStatus::Redeemed => "REDEEMED",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }
}

/// Loan record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub item_description: String,
    pub principal: f64,
    pub interest_rate: f64,
    /// Principal plus interest, fixed at creation
    pub total_payable: f64,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a loan record (id and timestamps are store-assigned)
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub customer_id: Uuid,
    pub item_description: String,
    pub principal: f64,
    pub interest_rate: f64,
    pub total_payable: f64,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub notes: Option<String>,
}

/// Enriched loan view returned to API clients.
///
/// Computed fresh on every read and never persisted; `status` inside the
/// flattened loan is the derived status, not necessarily the stored one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub customer: CustomerSummary,
    pub days_until_due: i64,
    pub total_repaid: f64,
    pub outstanding_balance: f64,
}

fn positive_principal(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        return Ok(());
    }
    let mut err = ValidationError::new("range");
    err.message = Some("Principal must be greater than zero".into());
    Err(err)
}

/// Request body for POST /api/loans
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Item description is required"))]
    pub item_description: String,
    #[validate(custom = "positive_principal")]
    pub principal: f64,
    #[validate(range(min = 0.0, message = "Interest rate must be positive"))]
    pub interest_rate: f64,
    pub start_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Request body for PATCH /api/loans/:id
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoanStatusRequest {
    pub status: LoanStatus,
}
