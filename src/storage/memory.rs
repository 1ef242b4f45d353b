//! In-memory store implementations
//!
//! HashMap-backed stores for development and tests. Uses `tokio::sync::RwLock`
//! for thread-safe access; every operation takes the lock for its whole
//! duration, so single-key reads and writes are internally consistent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Customer, CustomerPatch, Loan, LoanStatus, NewCustomer, NewLoan, NewRepayment, Repayment, User,
};

use super::{CustomerStore, LoanStore, RepaymentStore, StorageError, StorageResult, UserStore};

#[derive(Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<Uuid, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn list(&self) -> StorageResult<Vec<Customer>> {
        Ok(self.customers.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn create(&self, input: NewCustomer) -> StorageResult<Customer> {
        let now = Utc::now();
        let record = Customer {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        };
        self.customers.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: CustomerPatch) -> StorageResult<Customer> {
        let mut customers = self.customers.write().await;
        let existing = customers
            .get_mut(&id)
            .ok_or(StorageError::NotFound("Customer"))?;
        if let Some(first_name) = patch.first_name {
            existing.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            existing.last_name = last_name;
        }
        if let Some(email) = patch.email {
            existing.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            existing.phone = phone;
        }
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        self.customers.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLoanStore {
    loans: RwLock<HashMap<Uuid, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn list(&self) -> StorageResult<Vec<Loan>> {
        Ok(self.loans.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Loan>> {
        Ok(self.loans.read().await.get(&id).cloned())
    }

    async fn create(&self, input: NewLoan) -> StorageResult<Loan> {
        let now = Utc::now();
        let record = Loan {
            id: Uuid::new_v4(),
            customer_id: input.customer_id,
            item_description: input.item_description,
            principal: input.principal,
            interest_rate: input.interest_rate,
            total_payable: input.total_payable,
            start_date: input.start_date,
            due_date: input.due_date,
            status: input.status,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.loans.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_status(&self, id: Uuid, status: LoanStatus) -> StorageResult<Loan> {
        let mut loans = self.loans.write().await;
        let existing = loans.get_mut(&id).ok_or(StorageError::NotFound("Loan"))?;
        existing.status = status;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: LoanStatus,
        status: LoanStatus,
    ) -> StorageResult<bool> {
        let mut loans = self.loans.write().await;
        let existing = loans.get_mut(&id).ok_or(StorageError::NotFound("Loan"))?;
        if existing.status != expected {
            return Ok(false);
        }
        existing.status = status;
        existing.updated_at = Utc::now();
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryRepaymentStore {
    repayments: RwLock<HashMap<Uuid, Repayment>>,
}

impl InMemoryRepaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepaymentStore for InMemoryRepaymentStore {
    async fn list_all(&self) -> StorageResult<Vec<Repayment>> {
        Ok(self.repayments.read().await.values().cloned().collect())
    }

    async fn list_by_loan(&self, loan_id: Uuid) -> StorageResult<Vec<Repayment>> {
        Ok(self
            .repayments
            .read()
            .await
            .values()
            .filter(|r| r.loan_id == loan_id)
            .cloned()
            .collect())
    }

    async fn create(&self, input: NewRepayment) -> StorageResult<Repayment> {
        let now = Utc::now();
        let record = Repayment {
            id: Uuid::new_v4(),
            loan_id: input.loan_id,
            amount: input.amount,
            method: input.method,
            reference: input.reference,
            paid_at: input.paid_at,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.repayments
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: User) -> StorageResult<User> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }
}
