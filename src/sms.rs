//! Outbound SMS notifications
//!
//! Thin client over an HTTP SMS gateway. Without an API key the client runs
//! in mock mode and only logs the message, which is what development and the
//! test suite use. Delivery failures are reported to callers, who treat
//! notifications as best effort.

use tracing::{error, info};

/// Client for the configured SMS gateway
#[derive(Debug, Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    service_url: String,
    api_key: Option<String>,
    shop_name: String,
}

impl SmsClient {
    pub fn new(service_url: String, api_key: Option<String>, shop_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_url,
            api_key,
            shop_name,
        }
    }

    /// Send a message to one phone number.
    ///
    /// Mock mode (no API key) always succeeds.
    pub async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let Some(api_key) = &self.api_key else {
            info!(to = %to, "sms (mock): {}", message);
            return Ok(());
        };

        let body = serde_json::json!({
            "message": message,
            "numbers": [to],
        });

        self.http
            .post(&self.service_url)
            .header("Authorization", api_key)
            .json(&body)
            .send()
            .await
            .map_err(SmsError::from)?
            .error_for_status()
            .map_err(SmsError::from)?;

        Ok(())
    }

    /// Best-effort variant: log and swallow delivery failures
    pub async fn send_best_effort(&self, to: &str, message: &str) {
        if let Err(err) = self.send(to, message).await {
            error!(to = %to, "failed to send sms: {}", err);
        }
    }

    pub fn loan_created_message(
        &self,
        customer_name: &str,
        amount: f64,
        start_date: &str,
        item_description: &str,
    ) -> String {
        format!(
            "Dear {}, Your loan of {:.2} for {} has been created on {}. Thank you - {}.",
            customer_name, amount, item_description, start_date, self.shop_name
        )
    }

    pub fn payment_recorded_message(
        &self,
        customer_name: &str,
        amount: f64,
        date: &str,
        loan_id: &str,
    ) -> String {
        // Last six characters of the loan id serve as a short reference
        let short_id = &loan_id[loan_id.len().saturating_sub(6)..];
        format!(
            "Dear {}, Your payment of {:.2} for loan {} has been recorded on {}. Thank you - {}.",
            customer_name, amount, short_id, date, self.shop_name
        )
    }

    pub fn otp_message(&self, code: &str, ttl_minutes: u64) -> String {
        format!(
            "Your OTP for {} login is {}. Valid for {} minutes. Do not share this code.",
            self.shop_name, code, ttl_minutes
        )
    }
}

/// Error from the SMS gateway
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("sms request failed: {0}")]
    Request(#[from] reqwest::Error),
}
