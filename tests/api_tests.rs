//! HTTP API tests over the full router with in-memory storage

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use pawnvault_server::auth::{AuthService, OtpStore};
    use pawnvault_server::config::Environment;
    use pawnvault_server::routes;
    use pawnvault_server::services::{CustomerService, LoanService};
    use pawnvault_server::sms::SmsClient;
    use pawnvault_server::state::AppState;
    use pawnvault_server::storage::Storage;

    fn test_app() -> Router {
        let storage = Storage::in_memory();
        let sms = Arc::new(SmsClient::new(
            "http://localhost/sms".to_string(),
            None,
            "PawnVault".to_string(),
        ));
        let state = AppState {
            loan_service: LoanService::new(storage.clone(), sms.clone()),
            customer_service: CustomerService::new(storage.clone()),
            auth_service: Arc::new(AuthService::new(
                storage.users.clone(),
                "test-secret".to_string(),
                7200,
            )),
            otp_store: Arc::new(OtpStore::new(600)),
            sms,
            environment: Environment::Development,
        };
        routes::app_router().with_state(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }

    async fn register_and_login(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "staff@example.com",
                "password": "password123",
                "firstName": "Staff",
                "lastName": "Member",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "development");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = test_app();
        let token = register_and_login(&app).await;
        assert!(!token.is_empty());

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "staff@example.com",
                "password": "password123",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["email"], "staff@example.com");
        assert_eq!(body["user"]["role"], "clerk");
        // The password hash never appears in responses
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_register_validation_error_shape() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "short",
                "firstName": "A",
                "lastName": "B",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["issues"]["email"].is_array());
        assert!(body["issues"]["password"].is_array());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app();
        let (status, _) = send(&app, Method::GET, "/api/loans", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/api/customers", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customer_loan_repayment_flow() {
        let app = test_app();
        let token = register_and_login(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/customers",
            Some(&token),
            Some(json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "",
                "phone": "+1234567890",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Customer created");
        let customer_id = body["customer"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/loans",
            Some(&token),
            Some(json!({
                "customerId": customer_id,
                "itemDescription": "Gold ring",
                "principal": 650.0,
                "interestRate": 0.15,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["loan"]["totalPayable"], 747.5);
        assert_eq!(body["loan"]["status"], "ACTIVE");
        assert_eq!(body["loan"]["customer"]["firstName"], "Jane");
        let loan_id = body["loan"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/repayments",
            Some(&token),
            Some(json!({
                "loanId": loan_id,
                "amount": 747.5,
                "method": "card",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Repayment recorded");
        assert_eq!(body["loan"]["status"], "REDEEMED");
        assert_eq!(body["repayment"]["method"], "card");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/repayments/{}", loan_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["repayments"].as_array().unwrap().len(), 1);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/loans/{}", loan_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loan"]["outstandingBalance"], 0.0);
    }

    #[tokio::test]
    async fn test_get_unknown_loan_is_404() {
        let app = test_app();
        let token = register_and_login(&app).await;
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/loans/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Loan not found");
    }

    #[tokio::test]
    async fn test_reports_and_export() {
        let app = test_app();
        let token = register_and_login(&app).await;

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/customers",
            Some(&token),
            Some(json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "phone": "+1234567890",
            })),
        )
        .await;
        let customer_id = body["customer"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            Method::POST,
            "/api/loans",
            Some(&token),
            Some(json!({
                "customerId": customer_id,
                "itemDescription": "Gold ring",
                "principal": 650.0,
                "interestRate": 0.15,
            })),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/api/reports/monthly", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["totalLoans"], 1);
        assert_eq!(body["report"]["totalPrincipal"], 650.0);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/reports?type=yearly",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reports"].as_array().unwrap().len(), 1);
        assert_eq!(body["reports"][0]["name"], "Jane Doe");

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/reports/export?type=yearly")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=report-yearly.csv"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(csv.starts_with("customer_id,loan_id,"));
        assert!(csv.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_otp_login_flow() {
        let app = test_app();
        register_and_login(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/otp/request",
            None,
            Some(json!({ "email": "staff@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expiresIn"], 600);
        // Development mode echoes the code for testing
        let otp = body["otp"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/otp/verify",
            None,
            Some(json!({ "email": "staff@example.com", "otp": otp.clone() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OTP verified successfully");
        assert!(body["token"].as_str().is_some());

        // Same code cannot be used twice
        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/otp/verify",
            None,
            Some(json!({ "email": "staff@example.com", "otp": otp })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_otp_request_unknown_user() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/otp/request",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found. Please register first.");
    }
}
