use crate::infra::{bootstrap, open_file_store, parse_amount, parse_date};
use chrono::{NaiveDate, Utc};
use clap::Args;
use loan_intake::applications::{
    dashboard_view, ApplicationId, ApplicationSubmission, DashboardView, FormInput,
    LoanApplication, StatusDecision, StatusUpdate, ValidationErrors,
};
use loan_intake::error::AppError;
use std::fmt::Write as _;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Applicant's full name
    #[arg(long)]
    pub(crate) name: String,
    /// Contact email address
    #[arg(long)]
    pub(crate) email: String,
    /// Contact phone number
    #[arg(long)]
    pub(crate) phone: String,
    /// Requested loan amount (accepts $ and thousands separators)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) amount: f64,
    /// Loan purpose: home, car, education, business, personal, other
    #[arg(long)]
    pub(crate) purpose: String,
    /// Employment status: fulltime, parttime, selfemployed, unemployed, retired
    #[arg(long)]
    pub(crate) employment: String,
    /// Annual income (accepts $ and thousands separators)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) income: f64,
}

impl SubmitArgs {
    fn into_form(self) -> FormInput {
        FormInput {
            full_name: self.name,
            email: self.email,
            phone: self.phone,
            loan_amount: self.amount,
            purpose: self.purpose,
            employment_status: self.employment,
            annual_income: self.income,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Application id as printed by `submit` or `list`
    pub(crate) id: String,
    /// New status: approved or rejected
    pub(crate) decision: StatusDecision,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// Last day of the trend window (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the dashboard as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let submission = submission_from_args(args)?;

    let store = open_file_store(&config);
    println!("Submitting application...");
    let application = store.submit(submission).await;
    println!("{}", render_submitted(&application));
    Ok(())
}

/// Field errors travel back to `main`, which reports them once.
fn submission_from_args(args: SubmitArgs) -> Result<ApplicationSubmission, AppError> {
    Ok(args.into_form().into_submission()?)
}

pub(crate) fn run_list() -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_file_store(&config);
    print!("{}", render_application_list(&store.applications()));
    Ok(())
}

pub(crate) fn run_status(args: StatusArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_file_store(&config);
    let update = store.update_status(&ApplicationId(args.id), args.decision)?;
    println!("{}", render_status_update(&update));
    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_file_store(&config);
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let view = dashboard_view(&*store, today);

    if args.json {
        let payload = serde_json::to_string_pretty(&view)
            .map_err(|err| AppError::Input(format!("failed to encode dashboard: {err}")))?;
        println!("{payload}");
    } else {
        print!("{}", render_dashboard(&view));
    }
    Ok(())
}

pub(crate) fn render_validation_errors(errors: &ValidationErrors) -> String {
    let mut out = String::from("Application not submitted:\n");
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  - {}: {}", field.key(), message);
    }
    out
}

pub(crate) fn render_submitted(application: &LoanApplication) -> String {
    format!(
        "Application submitted: {} | {} | ${:.2} for {} | status {}",
        application.id,
        application.full_name,
        application.loan_amount,
        application.purpose.label(),
        application.status.label()
    )
}

pub(crate) fn render_application_list(applications: &[LoanApplication]) -> String {
    if applications.is_empty() {
        return "No applications yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} application(s)", applications.len());
    for application in applications {
        let _ = writeln!(
            out,
            "- {} | {} | {} | ${:.2} | {} | {} | {}",
            application.id,
            application.created_at.format("%Y-%m-%d %H:%M"),
            application.full_name,
            application.loan_amount,
            application.purpose.label(),
            application.employment_status.label(),
            application.status.label()
        );
    }
    out
}

pub(crate) fn render_status_update(update: &StatusUpdate) -> String {
    if update.changed {
        format!(
            "Application {} moved from {} to {}",
            update.application.id,
            update.previous_status.label(),
            update.application.status.label()
        )
    } else {
        format!(
            "Application {} is already {}",
            update.application.id,
            update.application.status.label()
        )
    }
}

pub(crate) fn render_dashboard(view: &DashboardView) -> String {
    let stats = &view.stats;
    let mut out = String::from("Loan application dashboard\n");
    let _ = writeln!(
        out,
        "- {} total | {} pending | {} approved | {} rejected",
        stats.total_applications,
        stats.pending_applications,
        stats.approved_applications,
        stats.rejected_applications
    );
    let _ = writeln!(
        out,
        "- ${:.2} requested in total | ${:.2} average",
        stats.total_loan_amount, stats.average_loan_amount
    );
    let _ = writeln!(
        out,
        "- {:.1}% approval rate | {:.1}% rejection rate",
        stats.approval_rate, view.rejection_rate
    );

    if view.has_status_data {
        out.push_str("Status breakdown:\n");
        for slice in &view.status_breakdown {
            let _ = writeln!(out, "  - {}: {}", slice.label, slice.count);
        }
    } else {
        out.push_str("Status breakdown: no data available\n");
    }

    let _ = writeln!(out, "Submissions over the last {} days:", view.trend.len());
    for point in &view.trend {
        let _ = writeln!(
            out,
            "  - {}: {} application(s), ${:.2}",
            point.label, point.count, point.amount
        );
    }

    if view.purposes.is_empty() {
        out.push_str("Top purposes: no data available\n");
    } else {
        out.push_str("Top purposes:\n");
        for share in &view.purposes {
            let _ = writeln!(out, "  - {}: {}", share.label, share.count);
        }
    }
    out
}
