//! Data models for the library reports service

pub mod book;
pub mod loan;
pub mod report;
pub mod student;

// Re-export commonly used types
pub use book::{BookSnapshot, Category};
pub use loan::{LoanMetrics, LoanQuery, LoanRecord, LoanStatus, LoanView, NewLoan};
pub use report::{LoanSummary, ReportFilter, ReportRow, ReportView};
pub use student::StudentSnapshot;
