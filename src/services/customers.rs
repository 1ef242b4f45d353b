//! Customer service

use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{CreateCustomerRequest, Customer, LoanStatus, UpdateCustomerRequest};
use crate::storage::Storage;

#[derive(Clone)]
pub struct CustomerService {
    storage: Storage,
}

impl CustomerService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All customers, newest first
    pub async fn list_customers(&self) -> ApiResult<Vec<Customer>> {
        let mut customers = self.storage.customers.list().await?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    pub async fn create_customer(&self, req: CreateCustomerRequest) -> ApiResult<Customer> {
        req.validate()?;
        let customer = self.storage.customers.create(req.into_new_customer()).await?;
        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        id: Uuid,
        req: UpdateCustomerRequest,
    ) -> ApiResult<Customer> {
        req.validate()?;
        let customer = self.storage.customers.update(id, req.into_patch()).await?;
        Ok(customer)
    }

    /// Delete a customer unless they still hold an ACTIVE loan
    pub async fn delete_customer(&self, id: Uuid) -> ApiResult<()> {
        let loans = self.storage.loans.list().await?;
        let has_active_loan = loans
            .iter()
            .any(|loan| loan.customer_id == id && loan.status == LoanStatus::Active);
        if has_active_loan {
            return Err(ApiError::Conflict(
                "Customer has active loans and cannot be deleted".to_string(),
            ));
        }
        self.storage.customers.delete(id).await?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}
