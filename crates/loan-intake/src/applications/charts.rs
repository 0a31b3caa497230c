use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::domain::{ApplicationStatus, LoanApplication, LoanPurpose};
use super::stats::DashboardStats;

/// Number of purposes shown in the distribution chart.
pub const PURPOSE_CHART_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSlice {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short axis label, e.g. `Oct 18`.
    pub label: String,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurposeShare {
    pub purpose: LoanPurpose,
    pub label: &'static str,
    pub count: usize,
}

/// Pending, approved, and rejected counts in that order.
pub fn status_breakdown(stats: &DashboardStats) -> Vec<StatusSlice> {
    [
        (ApplicationStatus::Pending, "Pending", stats.pending_applications),
        (ApplicationStatus::Approved, "Approved", stats.approved_applications),
        (ApplicationStatus::Rejected, "Rejected", stats.rejected_applications),
    ]
    .into_iter()
    .map(|(status, label, count)| StatusSlice {
        status,
        label,
        count,
    })
    .collect()
}

pub fn has_status_data(slices: &[StatusSlice]) -> bool {
    slices.iter().any(|slice| slice.count > 0)
}

/// Trailing `days` calendar days ending at `today`, oldest first.
///
/// Applications are bucketed by the UTC date of `created_at`; anything outside the
/// window is ignored.
pub fn daily_trend(applications: &[LoanApplication], today: NaiveDate, days: u32) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            TrendPoint {
                date,
                label: date.format("%b %d").to_string(),
                count: 0,
                amount: 0.0,
            }
        })
        .collect();

    let Some(first) = points.first().map(|point| point.date) else {
        return points;
    };

    for application in applications {
        let created = application.created_at.date_naive();
        if created < first || created > today {
            continue;
        }
        let index = (created - first).num_days() as usize;
        if let Some(point) = points.get_mut(index) {
            point.count += 1;
            point.amount += application.loan_amount;
        }
    }

    points
}

/// Most common purposes, highest count first, capped at [`PURPOSE_CHART_LIMIT`].
pub fn purpose_distribution(applications: &[LoanApplication]) -> Vec<PurposeShare> {
    let mut counts: HashMap<LoanPurpose, usize> = HashMap::new();
    for application in applications {
        *counts.entry(application.purpose).or_default() += 1;
    }

    let mut shares: Vec<PurposeShare> = counts
        .into_iter()
        .map(|(purpose, count)| PurposeShare {
            purpose,
            label: purpose.label(),
            count,
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count).then(a.purpose.cmp(&b.purpose)));
    shares.truncate(PURPOSE_CHART_LIMIT);
    shares
}
