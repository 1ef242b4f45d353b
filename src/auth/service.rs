//! Account registration and login
//!
//! Passwords are bcrypt hashed; successful register and login both hand back
//! a signed access token. Emails are lowercased before lookup so the address
//! acts as a case-insensitive account key.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::{self, JwtError};
use crate::error::ApiError;
use crate::models::{LoginRequest, PublicUser, RegisterRequest, User};
use crate::storage::{StorageError, UserStore};

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Account already exists for this email")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Jwt(e) => ApiError::Unauthorized(e.to_string()),
            AuthError::Storage(e) => ApiError::from(e),
            AuthError::Validation(e) => ApiError::Validation(e),
            AuthError::Hashing(e) => ApiError::Internal(e),
        }
    }
}

/// Token plus the public view of the account it belongs to
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl_seconds: i64,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_seconds: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl_seconds,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResult, AuthError> {
        req.validate()?;

        let email = req.email.to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
            password_hash: bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
                .map_err(|e| AuthError::Hashing(e.to_string()))?,
            created_at: now,
            updated_at: now,
        };
        let user = self.users.create(user).await?;

        tracing::info!(user_id = %user.id, "account registered");
        self.issue(&user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResult, AuthError> {
        req.validate()?;

        let email = req.email.to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = bcrypt::verify(&req.password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(&user)
    }

    /// Look up an account by email; used by the OTP flow
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_email(&email.to_lowercase()).await?)
    }

    /// Sign a fresh access token for an already-authenticated user
    pub fn issue(&self, user: &User) -> Result<AuthResult, AuthError> {
        let token = jwt::sign_token(user, &self.jwt_secret, self.token_ttl_seconds)?;
        Ok(AuthResult {
            token,
            user: PublicUser::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::storage::memory::InMemoryUserStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryUserStore::new()), "test-secret".to_string(), 7200)
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            first_name: "Pat".to_string(),
            last_name: "Broker".to_string(),
            role: UserRole::Clerk,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let registered = service.register(register_req("Pat@Example.com")).await.unwrap();
        assert_eq!(registered.user.email, "pat@example.com");
        assert!(!registered.token.is_empty());

        let logged_in = service
            .login(LoginRequest {
                email: "pat@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service.register(register_req("pat@example.com")).await.unwrap();
        let result = service.register(register_req("PAT@example.com")).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service();
        service.register(register_req("pat@example.com")).await.unwrap();
        let result = service
            .login(LoginRequest {
                email: "pat@example.com".to_string(),
                password: "wrong password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let result = service()
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever1".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
