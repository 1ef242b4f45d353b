//! Customer models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Empty strings are accepted and treated as "no email" downstream
fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Valid email required".into());
    Err(err)
}

/// Customer record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Customer summary embedded in enriched loan views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone().unwrap_or_default(),
            phone: customer.phone.clone(),
        }
    }
}

/// Fields for creating a customer record (id and timestamps are store-assigned)
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Request body for POST /api/customers
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(custom = "email_or_empty")]
    pub email: Option<String>,
    #[validate(length(min = 7, message = "Phone number is required"))]
    pub phone: String,
}

impl CreateCustomerRequest {
    /// Empty email strings are treated as absent
    pub fn into_new_customer(self) -> NewCustomer {
        NewCustomer {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.filter(|e| !e.is_empty()),
            phone: self.phone,
        }
    }
}

/// Request body for PUT /api/customers/:id
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[validate(custom = "email_or_empty")]
    pub email: Option<String>,
    #[validate(length(min = 7, message = "Phone number is required"))]
    pub phone: Option<String>,
}

impl UpdateCustomerRequest {
    pub fn into_patch(self) -> CustomerPatch {
        CustomerPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.filter(|e| !e.is_empty()),
            phone: self.phone,
        }
    }
}
