use crate::commands::{
    render_application_list, render_dashboard, render_status_update, render_submitted,
    render_validation_errors,
};
use crate::infra::parse_date;
use chrono::{NaiveDate, Utc};
use clap::Args;
use loan_intake::applications::{
    dashboard_view, ApplicationStore, FormInput, InMemoryRepository, StatusDecision,
    TransitionPolicy,
};
use loan_intake::config::StoreConfig;
use loan_intake::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the dashboard date (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the review step so every sample stays pending.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

struct Sample {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    amount: f64,
    purpose: &'static str,
    employment: &'static str,
    income: f64,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        name: "Morgan Lee",
        email: "morgan.lee@example.com",
        phone: "5155550101",
        amount: 320000.0,
        purpose: "home",
        employment: "fulltime",
        income: 118000.0,
    },
    Sample {
        name: "Sam Ortiz",
        email: "sam.ortiz@example.com",
        phone: "5155550102",
        amount: 24000.0,
        purpose: "car",
        employment: "parttime",
        income: 46000.0,
    },
    Sample {
        name: "Ari Patel",
        email: "ari.patel@example.com",
        phone: "5155550103",
        amount: 60000.0,
        purpose: "business",
        employment: "self-employed",
        income: 91000.0,
    },
    Sample {
        name: "Jamie Fox",
        email: "jamie.fox@example.com",
        phone: "5155550104",
        amount: 18000.0,
        purpose: "education",
        employment: "unemployed",
        income: 12000.0,
    },
    Sample {
        name: "Robin Okafor",
        email: "robin.okafor@example.com",
        phone: "5155550105",
        amount: 9500.0,
        purpose: "personal",
        employment: "retired",
        income: 38000.0,
    },
];

impl Sample {
    fn form(&self) -> FormInput {
        FormInput {
            full_name: self.name.to_string(),
            email: self.email.to_string(),
            phone: self.phone.to_string(),
            loan_amount: self.amount,
            purpose: self.purpose.to_string(),
            employment_status: self.employment.to_string(),
            annual_income: self.income,
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_review } = args;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    let store = Arc::new(ApplicationStore::open(
        Arc::new(InMemoryRepository::default()),
        StoreConfig {
            transitions: TransitionPolicy::Reject,
            ..StoreConfig::immediate()
        },
    ));

    println!("Loan intake demo");
    println!("\nRejected form");
    let incomplete = FormInput {
        full_name: "Al".to_string(),
        email: "al-at-example".to_string(),
        phone: "555".to_string(),
        loan_amount: 0.0,
        ..FormInput::default()
    };
    if let Err(errors) = incomplete.into_submission() {
        print!("{}", render_validation_errors(&errors));
    }

    println!("\nSubmissions");
    let mut submitted = Vec::with_capacity(SAMPLES.len());
    for sample in &SAMPLES {
        let submission = sample.form().into_submission()?;
        let application = store.submit(submission).await;
        println!("{}", render_submitted(&application));
        submitted.push(application.id);
    }

    if !skip_review {
        println!("\nReview");
        let decisions = [
            (0, StatusDecision::Approved),
            (2, StatusDecision::Approved),
            (3, StatusDecision::Rejected),
        ];
        for (index, decision) in decisions {
            let update = store.update_status(&submitted[index], decision)?;
            println!("{}", render_status_update(&update));
        }

        if let Err(err) = store.update_status(&submitted[3], StatusDecision::Approved) {
            println!("Second decision refused: {err}");
        }
    }

    println!();
    print!("{}", render_dashboard(&dashboard_view(&*store, today)));
    println!();
    print!("{}", render_application_list(&store.applications()));
    Ok(())
}
