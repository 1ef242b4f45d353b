//! PawnVault backend library
//!
//! Business management backend for a pawn shop: customers, collateral loans,
//! repayments, status lifecycle, reports and staff authentication.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod sms;
pub mod state;
pub mod storage;
