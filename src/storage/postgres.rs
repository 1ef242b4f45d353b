//! Postgres store implementations
//!
//! Thin sqlx wrappers over the repository traits. Timestamps are assigned
//! here rather than by column defaults so both backends behave identically.
//! The hot list paths are wrapped in the bounded retry helper.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Customer, CustomerPatch, Loan, LoanStatus, NewCustomer, NewLoan, NewRepayment, Repayment, User,
};

use super::retry::with_retry;
use super::{CustomerStore, LoanStore, RepaymentStore, StorageError, StorageResult, UserStore};

const LIST_RETRY_ATTEMPTS: u32 = 3;
const LIST_RETRY_DELAY: Duration = Duration::from_millis(200);

pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(&self) -> StorageResult<Vec<Customer>> {
        let pool = self.pool.clone();
        let customers = with_retry(LIST_RETRY_ATTEMPTS, LIST_RETRY_DELAY, move || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Customer>("SELECT * FROM customers")
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;
        Ok(customers)
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn create(&self, input: NewCustomer) -> StorageResult<Customer> {
        let now = Utc::now();
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, first_name, last_name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.email)
        .bind(input.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn update(&self, id: Uuid, patch: CustomerPatch) -> StorageResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                email      = COALESCE($4, email),
                phone      = COALESCE($5, phone),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("Customer"))?;
        Ok(customer)
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgLoanStore {
    pool: PgPool,
}

impl PgLoanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for PgLoanStore {
    async fn list(&self) -> StorageResult<Vec<Loan>> {
        let pool = self.pool.clone();
        let loans = with_retry(LIST_RETRY_ATTEMPTS, LIST_RETRY_DELAY, move || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Loan>("SELECT * FROM loans")
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;
        Ok(loans)
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    async fn create(&self, input: NewLoan) -> StorageResult<Loan> {
        let now = Utc::now();
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                id, customer_id, item_description, principal, interest_rate,
                total_payable, start_date, due_date, status, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.customer_id)
        .bind(input.item_description)
        .bind(input.principal)
        .bind(input.interest_rate)
        .bind(input.total_payable)
        .bind(input.start_date)
        .bind(input.due_date)
        .bind(input.status)
        .bind(input.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn update_status(&self, id: Uuid, status: LoanStatus) -> StorageResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("Loan"))?;
        Ok(loan)
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: LoanStatus,
        status: LoanStatus,
    ) -> StorageResult<bool> {
        // Single conditional UPDATE; the WHERE clause is the compare half
        // of the compare-and-swap.
        let result = sqlx::query(
            "UPDATE loans SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgRepaymentStore {
    pool: PgPool,
}

impl PgRepaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepaymentStore for PgRepaymentStore {
    async fn list_all(&self) -> StorageResult<Vec<Repayment>> {
        let pool = self.pool.clone();
        let repayments = with_retry(LIST_RETRY_ATTEMPTS, LIST_RETRY_DELAY, move || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Repayment>("SELECT * FROM repayments")
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;
        Ok(repayments)
    }

    async fn list_by_loan(&self, loan_id: Uuid) -> StorageResult<Vec<Repayment>> {
        let repayments =
            sqlx::query_as::<_, Repayment>("SELECT * FROM repayments WHERE loan_id = $1")
                .bind(loan_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(repayments)
    }

    async fn create(&self, input: NewRepayment) -> StorageResult<Repayment> {
        let now = Utc::now();
        let repayment = sqlx::query_as::<_, Repayment>(
            r#"
            INSERT INTO repayments (
                id, loan_id, amount, method, reference, paid_at, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.loan_id)
        .bind(input.amount)
        .bind(input.method)
        .bind(input.reference)
        .bind(input.paid_at)
        .bind(input.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(repayment)
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: User) -> StorageResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, role, password_hash,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.role)
        .bind(user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
