//! Business services

pub mod customers;
pub mod finance;
pub mod loans;

pub use customers::CustomerService;
pub use loans::{status_sweeper, LoanService};
