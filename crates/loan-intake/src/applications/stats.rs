use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, LoanApplication};

/// Aggregate metrics derived from the full application list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub rejected_applications: usize,
    pub average_loan_amount: f64,
    pub total_loan_amount: f64,
    /// Percentage in `0..=100`, unrounded.
    pub approval_rate: f64,
}

impl DashboardStats {
    /// Single pass over `applications`; every field is zero for an empty slice.
    pub fn compute(applications: &[LoanApplication]) -> Self {
        let mut stats = Self::default();

        for application in applications {
            match application.status {
                ApplicationStatus::Pending => stats.pending_applications += 1,
                ApplicationStatus::Approved => stats.approved_applications += 1,
                ApplicationStatus::Rejected => stats.rejected_applications += 1,
            }
            stats.total_loan_amount += application.loan_amount;
        }

        stats.total_applications = applications.len();
        stats.average_loan_amount = ratio(stats.total_loan_amount, stats.total_applications);
        stats.approval_rate =
            ratio(stats.approved_applications as f64, stats.total_applications) * 100.0;

        stats
    }

    /// Share of rejected applications as a percentage.
    pub fn rejection_rate(&self) -> f64 {
        ratio(self.rejected_applications as f64, self.total_applications) * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_applications == 0
    }
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / count as f64
    }
}
