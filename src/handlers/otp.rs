//! One-time passcode login handlers
//!
//! Request a code (delivered by SMS when the account has a phone on file)
//! and exchange it for an access token. Outside production the code is
//! echoed in the response so the flow can be exercised without a gateway.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for POST /auth/otp/request
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpBody {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    pub phone: Option<String>,
}

/// Request body for POST /auth/otp/verify
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpBody {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

/// POST /auth/otp/request
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpBody>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    if state
        .auth_service
        .find_user_by_email(&email)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::NotFound(
            "User not found. Please register first.".to_string(),
        ));
    }

    let code = state.otp_store.create(&email).await;

    if let Some(phone) = payload.phone.as_deref().filter(|p| !p.is_empty()) {
        let ttl_minutes = state.otp_store.ttl_seconds() / 60;
        let message = state.sms.otp_message(&code, ttl_minutes);
        state.sms.send_best_effort(phone, &message).await;
    }

    let mut body = json!({
        "message": "OTP generated successfully",
        "expiresIn": state.otp_store.ttl_seconds(),
    });
    // Codes are never echoed back in production
    if !state.environment.is_production() {
        body["otp"] = json!(code);
    }

    Ok(Json(body))
}

/// POST /auth/otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpBody>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    if !state.otp_store.verify(&email, &payload.otp).await {
        return Err(ApiError::Unauthorized("Invalid or expired OTP".to_string()));
    }

    let user = state
        .auth_service
        .find_user_by_email(&email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let result = state.auth_service.issue(&user).map_err(ApiError::from)?;

    Ok(Json(json!({
        "message": "OTP verified successfully",
        "token": result.token,
        "user": result.user,
    })))
}
