//! Storage layer
//!
//! Repository traits with two interchangeable backends: an in-memory
//! implementation for development and tests, and a Postgres implementation
//! for deployments. Services only ever see the trait objects, so the
//! backend is purely a startup decision.

pub mod memory;
pub mod postgres;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Customer, CustomerPatch, Loan, LoanStatus, NewCustomer, NewLoan, NewRepayment, Repayment, User,
};

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The named entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list(&self) -> StorageResult<Vec<Customer>>;
    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Customer>>;
    async fn create(&self, input: NewCustomer) -> StorageResult<Customer>;
    async fn update(&self, id: Uuid, patch: CustomerPatch) -> StorageResult<Customer>;
    async fn delete(&self, id: Uuid) -> StorageResult<()>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn list(&self) -> StorageResult<Vec<Loan>>;
    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Loan>>;
    async fn create(&self, input: NewLoan) -> StorageResult<Loan>;

    /// Unconditional status write, used for administrative overrides
    async fn update_status(&self, id: Uuid, status: LoanStatus) -> StorageResult<Loan>;

    /// Conditional status write: applies only while the persisted status
    /// still equals `expected`. Returns whether the write was applied.
    /// Derived-status write-backs go through this so concurrent updates of
    /// the same loan cannot clobber each other.
    async fn update_status_if(
        &self,
        id: Uuid,
        expected: LoanStatus,
        status: LoanStatus,
    ) -> StorageResult<bool>;
}

#[async_trait]
pub trait RepaymentStore: Send + Sync {
    async fn list_all(&self) -> StorageResult<Vec<Repayment>>;
    async fn list_by_loan(&self, loan_id: Uuid) -> StorageResult<Vec<Repayment>>;
    async fn create(&self, input: NewRepayment) -> StorageResult<Repayment>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;
    async fn create(&self, user: User) -> StorageResult<User>;
}

/// Bundle of the per-entity stores, injected into the service layer
#[derive(Clone)]
pub struct Storage {
    pub customers: Arc<dyn CustomerStore>,
    pub loans: Arc<dyn LoanStore>,
    pub repayments: Arc<dyn RepaymentStore>,
    pub users: Arc<dyn UserStore>,
}

impl Storage {
    /// All stores backed by in-process HashMaps
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(memory::InMemoryCustomerStore::new()),
            loans: Arc::new(memory::InMemoryLoanStore::new()),
            repayments: Arc::new(memory::InMemoryRepaymentStore::new()),
            users: Arc::new(memory::InMemoryUserStore::new()),
        }
    }

    /// All stores backed by the given Postgres pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            customers: Arc::new(postgres::PgCustomerStore::new(pool.clone())),
            loans: Arc::new(postgres::PgLoanStore::new(pool.clone())),
            repayments: Arc::new(postgres::PgRepaymentStore::new(pool.clone())),
            users: Arc::new(postgres::PgUserStore::new(pool)),
        }
    }
}
