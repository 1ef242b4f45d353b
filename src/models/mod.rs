//! Domain models and request/response types

mod customer;
mod loan;
mod repayment;
mod report;
mod user;

pub use customer::{
    CreateCustomerRequest, Customer, CustomerPatch, CustomerSummary, NewCustomer,
    UpdateCustomerRequest,
};
pub use loan::{CreateLoanRequest, Loan, LoanStatus, LoanView, NewLoan, UpdateLoanStatusRequest};
pub use repayment::{CreateRepaymentRequest, NewRepayment, Repayment, RepaymentMethod};
pub use report::{LoanReportRow, MonthlyReport, ReportKind, ReportQuery};
pub use user::{LoginRequest, PublicUser, RegisterRequest, User, UserRole};
