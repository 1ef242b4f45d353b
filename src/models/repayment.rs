//! Repayment models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// How a repayment was made
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "repayment_method", rename_all = "lowercase")]
pub enum RepaymentMethod {
    Cash,
    Card,
    Bank,
}

impl Default for RepaymentMethod {
    fn default() -> Self {
        RepaymentMethod::Cash
    }
}

/// Repayment record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: f64,
    pub method: RepaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a repayment record
#[derive(Debug, Clone)]
pub struct NewRepayment {
    pub loan_id: Uuid,
    pub amount: f64,
    pub method: RepaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
}

fn positive_amount(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        return Ok(());
    }
    let mut err = ValidationError::new("range");
    err.message = Some("Payment amount must be greater than zero".into());
    Err(err)
}

/// Request body for POST /api/repayments
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepaymentRequest {
    pub loan_id: Uuid,
    #[validate(custom = "positive_amount")]
    pub amount: f64,
    #[serde(default)]
    pub method: RepaymentMethod,
    #[validate(length(max = 80))]
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}
