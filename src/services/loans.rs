//! Loan lifecycle service
//!
//! Owns loan creation, enrichment, repayment recording, status sync and the
//! reporting queries. Stored status is only a cache of the derived one; every
//! read re-derives and the write-back paths use compare-and-set updates so a
//! concurrent repayment cannot be overwritten with a stale status.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, TimeZone, Utc};
use futures_util::future::join_all;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateLoanRequest, CreateRepaymentRequest, Customer, CustomerSummary, Loan, LoanReportRow,
    LoanStatus, LoanView, MonthlyReport, NewLoan, NewRepayment, Repayment, ReportKind,
    UpdateLoanStatusRequest,
};
use crate::services::finance;
use crate::sms::SmsClient;
use crate::storage::Storage;

/// New loans run for one calendar month; renewals extend by repricing
const DEFAULT_DURATION_MONTHS: f64 = 1.0;

#[derive(Clone)]
pub struct LoanService {
    storage: Storage,
    sms: Arc<SmsClient>,
}

impl LoanService {
    pub fn new(storage: Storage, sms: Arc<SmsClient>) -> Self {
        Self { storage, sms }
    }

    /// All loans, enriched, newest first
    pub async fn list_loans(&self) -> ApiResult<Vec<LoanView>> {
        let records = self.storage.loans.list().await?;
        self.enrich(records).await
    }

    /// A single enriched loan, or `None` when the id is unknown
    pub async fn get_loan(&self, id: Uuid) -> ApiResult<Option<LoanView>> {
        let Some(record) = self.storage.loans.get_by_id(id).await? else {
            return Ok(None);
        };
        let mut views = self.enrich(vec![record]).await?;
        Ok(views.pop())
    }

    pub async fn create_loan(&self, req: CreateLoanRequest) -> ApiResult<LoanView> {
        req.validate()?;

        let customer = self
            .storage
            .customers
            .get_by_id(req.customer_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

        let start_date = req.start_date.unwrap_or_else(Utc::now);
        let total_payable =
            finance::calculate_total_payable(req.principal, req.interest_rate, DEFAULT_DURATION_MONTHS);
        let due_date = finance::calculate_due_date(start_date, DEFAULT_DURATION_MONTHS);

        let record = self
            .storage
            .loans
            .create(NewLoan {
                customer_id: req.customer_id,
                item_description: req.item_description,
                principal: req.principal,
                interest_rate: req.interest_rate,
                total_payable,
                start_date,
                due_date,
                status: LoanStatus::Active,
                notes: req.notes,
            })
            .await?;

        info!(loan_id = %record.id, customer_id = %customer.id, "loan created");

        let mut views = self.enrich(vec![record.clone()]).await?;
        let view = views
            .pop()
            .ok_or_else(|| ApiError::Internal("loan enrichment produced no view".to_string()))?;

        if !customer.phone.is_empty() {
            let message = self.sms.loan_created_message(
                &customer.full_name(),
                record.principal,
                &record.start_date.format("%d/%m/%Y").to_string(),
                &record.item_description,
            );
            self.sms.send_best_effort(&customer.phone, &message).await;
        }

        Ok(view)
    }

    /// Manual status override, bypassing derivation. Marking DEFAULTED and
    /// correcting mistakes go through here.
    pub async fn update_loan_status(
        &self,
        id: Uuid,
        req: UpdateLoanStatusRequest,
    ) -> ApiResult<LoanView> {
        let record = self.storage.loans.update_status(id, req.status).await?;
        info!(loan_id = %id, status = record.status.as_str(), "loan status updated");
        let mut views = self.enrich(vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| ApiError::Internal("loan enrichment produced no view".to_string()))
    }

    /// Record a payment against a loan and refresh its stored status.
    ///
    /// The status derivation feeds in the pre-repayment stored status, so a
    /// DEFAULTED loan stays DEFAULTED under partial payment and flips to
    /// REDEEMED only when this payment clears the balance. The write-back is
    /// conditional on the status we read; losing that race is fine because
    /// whoever won wrote a fresher derivation.
    pub async fn record_repayment(
        &self,
        req: CreateRepaymentRequest,
    ) -> ApiResult<(Repayment, LoanView)> {
        req.validate()?;

        let loan = self
            .storage
            .loans
            .get_by_id(req.loan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;
        let prior_status = loan.status;

        let paid_at = req.paid_at.unwrap_or_else(Utc::now);
        let repayment = self
            .storage
            .repayments
            .create(NewRepayment {
                loan_id: req.loan_id,
                amount: req.amount,
                method: req.method,
                reference: req.reference,
                paid_at,
                notes: req.notes,
            })
            .await?;

        let mut views = self.enrich(vec![loan.clone()]).await?;
        let enriched = views
            .pop()
            .ok_or_else(|| ApiError::Internal("loan enrichment produced no view".to_string()))?;

        let derived = finance::determine_status(
            prior_status,
            enriched.outstanding_balance,
            enriched.days_until_due,
        );
        if derived != prior_status {
            // Best effort: the enriched result is returned either way and
            // the background sweep reconciles later
            match self
                .storage
                .loans
                .update_status_if(loan.id, prior_status, derived)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    warn!(loan_id = %loan.id, "skipped status write-back, loan changed concurrently")
                }
                Err(err) => error!(loan_id = %loan.id, "status write-back failed: {}", err),
            }
        }

        info!(loan_id = %loan.id, amount = req.amount, "repayment recorded");

        let customer = &enriched.customer;
        if !customer.phone.is_empty() {
            let message = self.sms.payment_recorded_message(
                &format!("{} {}", customer.first_name, customer.last_name),
                repayment.amount,
                &paid_at.format("%d/%m/%Y").to_string(),
                &loan.id.to_string(),
            );
            self.sms.send_best_effort(&customer.phone, &message).await;
        }

        // Re-enrich with the derived status as the stored one so the caller
        // sees the post-payment state
        let refreshed = Loan {
            status: derived,
            ..loan
        };
        let mut views = self.enrich(vec![refreshed]).await?;
        let latest = views
            .pop()
            .ok_or_else(|| ApiError::Internal("loan enrichment produced no view".to_string()))?;

        Ok((repayment, latest))
    }

    /// Payment history for one loan, oldest first
    pub async fn list_repayments_by_loan(&self, loan_id: Uuid) -> ApiResult<Vec<Repayment>> {
        let mut repayments = self.storage.repayments.list_by_loan(loan_id).await?;
        repayments.sort_by_key(|r| r.paid_at);
        Ok(repayments)
    }

    /// Re-derive every loan's status and persist the ones that drifted.
    ///
    /// Write-backs are conditional and best effort; a loan that changed
    /// under us is picked up on the next sweep.
    pub async fn sync_loan_statuses(&self) -> ApiResult<Vec<LoanView>> {
        let records = self.storage.loans.list().await?;
        let stored: HashMap<Uuid, LoanStatus> =
            records.iter().map(|r| (r.id, r.status)).collect();
        let enriched = self.enrich(records).await?;

        let updates = enriched.iter().filter_map(|view| {
            let prior = *stored.get(&view.loan.id)?;
            if prior == view.loan.status {
                return None;
            }
            let loans = self.storage.loans.clone();
            let id = view.loan.id;
            let status = view.loan.status;
            Some(async move {
                match loans.update_status_if(id, prior, status).await {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(loan_id = %id, "status sync skipped, loan changed concurrently")
                    }
                    Err(err) => error!(loan_id = %id, "status sync failed: {}", err),
                }
            })
        });
        join_all(updates).await;

        Ok(enriched)
    }

    /// Aggregate metrics over the whole book
    pub async fn monthly_report(&self) -> ApiResult<MonthlyReport> {
        let loans = self.list_loans().await?;

        let total_principal: f64 = loans.iter().map(|l| l.loan.principal).sum();
        let total_payable: f64 = loans.iter().map(|l| l.loan.total_payable).sum();
        let total_repaid: f64 = loans.iter().map(|l| l.total_repaid).sum();
        let active = loans
            .iter()
            .filter(|l| l.loan.status == LoanStatus::Active)
            .count();
        let redeemed = loans
            .iter()
            .filter(|l| l.loan.status == LoanStatus::Redeemed)
            .count();

        Ok(MonthlyReport {
            total_loans: loans.len(),
            total_principal,
            total_payable,
            total_repaid,
            total_interest_earned: total_payable - total_principal,
            pending_loans: active,
            active_loans: active,
            redeemed_loans: redeemed,
        })
    }

    /// Flat report rows for loans created inside the current day, month or
    /// year. Interest is re-quoted from the loan's actual start-to-due span
    /// in 30-day months, with the rate taken as a percentage as stored.
    pub async fn filtered_reports(&self, kind: ReportKind) -> ApiResult<Vec<LoanReportRow>> {
        let loans = self.list_loans().await?;
        let now = Utc::now();

        let (start, end) = match kind {
            ReportKind::Daily => {
                let day = Utc
                    .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                    .single()
                    .ok_or_else(|| ApiError::Internal("invalid report window".to_string()))?;
                (day, day + chrono::Duration::days(1))
            }
            ReportKind::Monthly => {
                let first = Utc
                    .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                    .single()
                    .ok_or_else(|| ApiError::Internal("invalid report window".to_string()))?;
                let next = if now.month() == 12 {
                    Utc.with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0)
                } else {
                    Utc.with_ymd_and_hms(now.year(), now.month() + 1, 1, 0, 0, 0)
                }
                .single()
                .ok_or_else(|| ApiError::Internal("invalid report window".to_string()))?;
                (first, next)
            }
            ReportKind::Yearly => {
                let first = Utc
                    .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                    .single()
                    .ok_or_else(|| ApiError::Internal("invalid report window".to_string()))?;
                let next = Utc
                    .with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0)
                    .single()
                    .ok_or_else(|| ApiError::Internal("invalid report window".to_string()))?;
                (first, next)
            }
        };

        let rows = loans
            .into_iter()
            .filter(|l| l.loan.created_at >= start && l.loan.created_at < end)
            .map(|l| {
                let span_seconds = (l.loan.due_date - l.loan.start_date).num_seconds() as f64;
                let months = (span_seconds / (30.0 * 86_400.0)).ceil().max(1.0);
                let interest_amount = l.loan.principal * l.loan.interest_rate * months / 100.0;
                let total_amount = l.loan.principal + interest_amount;

                LoanReportRow {
                    customer_id: l.customer.id,
                    loan_id: l.loan.id,
                    start_date: l.loan.start_date.format("%Y-%m-%d").to_string(),
                    name: format!("{} {}", l.customer.first_name, l.customer.last_name),
                    phone: l.customer.phone.clone(),
                    item: l.loan.item_description.clone(),
                    amount: l.loan.principal,
                    due_date: l.loan.due_date.format("%Y-%m-%d").to_string(),
                    interest_amount: finance::round2(interest_amount),
                    total_amount: finance::round2(total_amount),
                }
            })
            .collect();

        Ok(rows)
    }

    /// Join loans with their customer and repayment history and derive the
    /// current status of each. Fails the whole batch if a loan references a
    /// customer that no longer exists, which indicates corrupt data.
    async fn enrich(&self, records: Vec<Loan>) -> ApiResult<Vec<LoanView>> {
        let customers = self.storage.customers.list().await?;
        let customer_map: HashMap<Uuid, Customer> =
            customers.into_iter().map(|c| (c.id, c)).collect();

        let mut repayments_by_loan: HashMap<Uuid, Vec<Repayment>> = HashMap::new();
        for repayment in self.storage.repayments.list_all().await? {
            repayments_by_loan
                .entry(repayment.loan_id)
                .or_default()
                .push(repayment);
        }

        let now = Utc::now();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let customer = customer_map.get(&record.customer_id).ok_or_else(|| {
                ApiError::Internal(format!(
                    "customer {} not found for loan {}",
                    record.customer_id, record.id
                ))
            })?;

            let days_until_due = finance::days_until_due(record.due_date, now);
            let total_repaid: f64 = repayments_by_loan
                .get(&record.id)
                .map(|list| list.iter().map(|r| r.amount).sum())
                .unwrap_or(0.0);
            let outstanding_balance = (record.total_payable - total_repaid).max(0.0);
            let status =
                finance::determine_status(record.status, outstanding_balance, days_until_due);

            views.push(LoanView {
                customer: CustomerSummary::from(customer),
                days_until_due,
                total_repaid,
                outstanding_balance,
                loan: Loan { status, ..record },
            });
        }

        views.sort_by(|a, b| b.loan.created_at.cmp(&a.loan.created_at));
        Ok(views)
    }
}

/// Periodic status sweep, spawned at startup.
///
/// Runs forever; sync failures are logged and the loop keeps going.
pub async fn status_sweeper(service: LoanService, interval_seconds: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match service.sync_loan_statuses().await {
            Ok(loans) => info!(count = loans.len(), "loan status sweep completed"),
            Err(err) => error!("loan status sweep failed: {}", err),
        }
    }
}
