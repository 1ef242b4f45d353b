//! Authentication: JWT tokens, account service and one-time passcodes

pub mod jwt;
pub mod otp;
pub mod service;

pub use jwt::{verify_token, Claims, JwtError};
pub use otp::OtpStore;
pub use service::{AuthError, AuthResult, AuthService};
