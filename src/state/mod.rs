//! Shared application state

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AuthService, OtpStore};
use crate::config::Environment;
use crate::services::{CustomerService, LoanService};
use crate::sms::SmsClient;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub loan_service: LoanService,
    pub customer_service: CustomerService,
    pub auth_service: Arc<AuthService>,
    pub otp_store: Arc<OtpStore>,
    pub sms: Arc<SmsClient>,
    pub environment: Environment,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}
