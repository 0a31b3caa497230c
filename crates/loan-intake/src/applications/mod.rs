//! Loan application intake: the store that owns the application list, its persistence,
//! the derived dashboard statistics, and the HTTP surface over them.

pub mod charts;
pub mod domain;
pub mod repository;
pub mod router;
pub mod stats;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use charts::{
    daily_trend, purpose_distribution, status_breakdown, PurposeShare, StatusSlice, TrendPoint,
};
pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, CategoryParseError,
    EmploymentStatus, LoanApplication, LoanPurpose, StatusDecision,
};
pub use repository::{
    ApplicationRepository, InMemoryRepository, JsonFileRepository, RepositoryError, STORAGE_KEY,
};
pub use router::{application_router, dashboard_view, DashboardView};
pub use stats::DashboardStats;
pub use store::{
    ApplicationStore, StatusUpdate, StoreError, StoreEvent, StoreSnapshot, TransitionPolicy,
};
pub use validation::{validate, FormField, FormInput, ValidationErrors};
