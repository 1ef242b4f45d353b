//! Loan lifecycle tests over in-memory storage
//!
//! Exercise the full service path: create a customer, pawn an item, record
//! repayments and watch the status move through its lifecycle.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use pawnvault_server::error::ApiError;
    use pawnvault_server::models::{
        CreateCustomerRequest, CreateLoanRequest, CreateRepaymentRequest, Customer, LoanStatus,
        RepaymentMethod, UpdateLoanStatusRequest,
    };
    use pawnvault_server::services::{CustomerService, LoanService};
    use pawnvault_server::sms::SmsClient;
    use pawnvault_server::storage::{LoanStore, Storage};

    fn services() -> (Storage, LoanService, CustomerService) {
        let storage = Storage::in_memory();
        let sms = Arc::new(SmsClient::new(
            "http://localhost/sms".to_string(),
            None,
            "PawnVault".to_string(),
        ));
        let loans = LoanService::new(storage.clone(), sms);
        let customers = CustomerService::new(storage.clone());
        (storage, loans, customers)
    }

    async fn create_customer(customers: &CustomerService) -> Customer {
        customers
            .create_customer(CreateCustomerRequest {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                phone: "+1234567890".to_string(),
            })
            .await
            .expect("customer creation failed")
    }

    fn loan_request(customer_id: Uuid) -> CreateLoanRequest {
        CreateLoanRequest {
            customer_id,
            item_description: "Gold ring".to_string(),
            principal: 650.0,
            interest_rate: 0.15,
            start_date: None,
            notes: None,
        }
    }

    fn repayment_request(loan_id: Uuid, amount: f64) -> CreateRepaymentRequest {
        CreateRepaymentRequest {
            loan_id,
            amount,
            method: RepaymentMethod::Cash,
            reference: None,
            paid_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_loan_prices_one_month() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        // 650 at 15% for the fixed one-month term
        assert_eq!(loan.loan.total_payable, 747.5);
        assert_eq!(loan.loan.status, LoanStatus::Active);
        assert_eq!(loan.outstanding_balance, 747.5);
        assert_eq!(loan.total_repaid, 0.0);
        assert_eq!(loan.customer.id, customer.id);
        // Due roughly a month out
        assert!(loan.days_until_due >= 28 && loan.days_until_due <= 31);
    }

    #[tokio::test]
    async fn test_create_loan_unknown_customer() {
        let (_storage, loans, _customers) = services();
        let result = loans.create_loan(loan_request(Uuid::new_v4())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_full_repayment_redeems_loan() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let (repayment, updated) = loans
            .record_repayment(repayment_request(loan.loan.id, 747.5))
            .await
            .unwrap();

        assert_eq!(repayment.amount, 747.5);
        assert_eq!(updated.loan.status, LoanStatus::Redeemed);
        assert_eq!(updated.outstanding_balance, 0.0);

        // The derived status was persisted
        let fetched = loans.get_loan(loan.loan.id).await.unwrap().unwrap();
        assert_eq!(fetched.loan.status, LoanStatus::Redeemed);
    }

    #[tokio::test]
    async fn test_partial_repayment_keeps_loan_active() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let (_, updated) = loans
            .record_repayment(repayment_request(loan.loan.id, 200.0))
            .await
            .unwrap();

        assert_eq!(updated.loan.status, LoanStatus::Active);
        assert_eq!(updated.total_repaid, 200.0);
        assert_eq!(updated.outstanding_balance, 547.5);
    }

    #[tokio::test]
    async fn test_partial_repayment_on_overdue_loan_stays_late() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        // Backdate the start so the one-month term is already past due
        let mut req = loan_request(customer.id);
        req.start_date = Some(Utc::now() - Duration::days(90));
        let loan = loans.create_loan(req).await.unwrap();

        let (_, updated) = loans
            .record_repayment(repayment_request(loan.loan.id, 100.0))
            .await
            .unwrap();

        assert!(updated.days_until_due < 0);
        assert_eq!(updated.loan.status, LoanStatus::Late);
    }

    #[tokio::test]
    async fn test_defaulted_is_sticky_under_partial_payment() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        loans
            .update_loan_status(
                loan.loan.id,
                UpdateLoanStatusRequest {
                    status: LoanStatus::Defaulted,
                },
            )
            .await
            .unwrap();

        let (_, updated) = loans
            .record_repayment(repayment_request(loan.loan.id, 100.0))
            .await
            .unwrap();
        assert_eq!(updated.loan.status, LoanStatus::Defaulted);

        // Clearing the balance redeems even a defaulted loan
        let (_, redeemed) = loans
            .record_repayment(repayment_request(loan.loan.id, 647.5))
            .await
            .unwrap();
        assert_eq!(redeemed.loan.status, LoanStatus::Redeemed);
    }

    #[tokio::test]
    async fn test_zero_amount_repayment_rejected() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let result = loans
            .record_repayment(repayment_request(loan.loan.id, 0.0))
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_repayment_on_unknown_loan() {
        let (_storage, loans, _customers) = services();
        let result = loans
            .record_repayment(repayment_request(Uuid::new_v4(), 50.0))
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_loan_missing_returns_none() {
        let (_storage, loans, _customers) = services();
        assert!(loans.get_loan(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_flips_overdue_loans_to_late() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        let mut overdue = loan_request(customer.id);
        overdue.start_date = Some(Utc::now() - Duration::days(90));
        let overdue = loans.create_loan(overdue).await.unwrap();
        let current = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let synced = loans.sync_loan_statuses().await.unwrap();
        assert_eq!(synced.len(), 2);

        let stored_overdue = loans.get_loan(overdue.loan.id).await.unwrap().unwrap();
        assert_eq!(stored_overdue.loan.status, LoanStatus::Late);
        let stored_current = loans.get_loan(current.loan.id).await.unwrap().unwrap();
        assert_eq!(stored_current.loan.status, LoanStatus::Active);
    }

    #[tokio::test]
    async fn test_repayments_listed_oldest_first() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let now = Utc::now();
        for (amount, offset_days) in [(50.0, 0), (75.0, -10), (25.0, -5)] {
            let mut req = repayment_request(loan.loan.id, amount);
            req.paid_at = Some(now + Duration::days(offset_days));
            loans.record_repayment(req).await.unwrap();
        }

        let history = loans.list_repayments_by_loan(loan.loan.id).await.unwrap();
        let amounts: Vec<f64> = history.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![75.0, 25.0, 50.0]);
    }

    #[tokio::test]
    async fn test_monthly_report_totals() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        let first = loans.create_loan(loan_request(customer.id)).await.unwrap();
        let mut second = loan_request(customer.id);
        second.principal = 1000.0;
        second.interest_rate = 0.1;
        loans.create_loan(second).await.unwrap();

        loans
            .record_repayment(repayment_request(first.loan.id, 747.5))
            .await
            .unwrap();

        let report = loans.monthly_report().await.unwrap();
        assert_eq!(report.total_loans, 2);
        assert_eq!(report.total_principal, 1650.0);
        assert_eq!(report.total_payable, 747.5 + 1100.0);
        assert_eq!(report.total_repaid, 747.5);
        assert!((report.total_interest_earned - 197.5).abs() < 1e-9);
        assert_eq!(report.active_loans, 1);
        assert_eq!(report.redeemed_loans, 1);
    }

    #[tokio::test]
    async fn test_customer_with_active_loan_cannot_be_deleted() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;
        let loan = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let result = customers.delete_customer(customer.id).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));

        // Redeem the loan, then deletion goes through
        loans
            .record_repayment(repayment_request(loan.loan.id, 747.5))
            .await
            .unwrap();
        customers.delete_customer(customer.id).await.unwrap();
        assert!(customers.list_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loans_listed_newest_first() {
        let (_storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        let first = loans.create_loan(loan_request(customer.id)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = loans.create_loan(loan_request(customer.id)).await.unwrap();

        let listed = loans.list_loans().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].loan.id, second.loan.id);
        assert_eq!(listed[1].loan.id, first.loan.id);
    }

    #[tokio::test]
    async fn test_listing_is_a_pure_read() {
        let (storage, loans, customers) = services();
        let customer = create_customer(&customers).await;

        let mut overdue = loan_request(customer.id);
        overdue.start_date = Some(Utc::now() - Duration::days(90));
        let overdue = loans.create_loan(overdue).await.unwrap();
        let current = loans.create_loan(loan_request(customer.id)).await.unwrap();
        loans
            .record_repayment(repayment_request(current.loan.id, 200.0))
            .await
            .unwrap();

        // Everything except daysUntilDue must match between two listings
        // of the same unchanged book
        let strip_clock = |views: Vec<pawnvault_server::models::LoanView>| -> Vec<serde_json::Value> {
            views
                .into_iter()
                .map(|view| {
                    let mut value = serde_json::to_value(view).unwrap();
                    value.as_object_mut().unwrap().remove("daysUntilDue");
                    value
                })
                .collect()
        };

        let first_pass = strip_clock(loans.list_loans().await.unwrap());
        let second_pass = strip_clock(loans.list_loans().await.unwrap());
        assert_eq!(first_pass, second_pass);

        // The view derives LATE for the overdue loan
        let late_view = first_pass
            .iter()
            .find(|view| view["id"] == serde_json::json!(overdue.loan.id))
            .unwrap();
        assert_eq!(late_view["status"], "LATE");

        // but a read never writes the derived status back
        let stored = storage
            .loans
            .get_by_id(overdue.loan.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, LoanStatus::Active);
    }
}
