use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::applications::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, EmploymentStatus, LoanApplication,
    LoanPurpose,
};
use crate::applications::repository::{
    ApplicationRepository, InMemoryRepository, RepositoryError,
};
use crate::applications::store::{ApplicationStore, TransitionPolicy};
use crate::applications::application_router;
use crate::config::StoreConfig;

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: "Jordan Avery".to_string(),
        email: "jordan.avery@example.com".to_string(),
        phone: "5155550134".to_string(),
        loan_amount: 5000.0,
        purpose: LoanPurpose::Car,
        employment_status: EmploymentStatus::Fulltime,
        annual_income: 64000.0,
    }
}

pub(super) fn submission_for(amount: f64, purpose: LoanPurpose) -> ApplicationSubmission {
    ApplicationSubmission {
        loan_amount: amount,
        purpose,
        ..submission()
    }
}

pub(super) fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn application(
    id: &str,
    amount: f64,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
) -> LoanApplication {
    LoanApplication {
        id: ApplicationId::from(id),
        full_name: "Casey Morgan".to_string(),
        email: "casey@example.com".to_string(),
        phone: "3195550199".to_string(),
        loan_amount: amount,
        purpose: LoanPurpose::Home,
        employment_status: EmploymentStatus::Selfemployed,
        annual_income: 88000.0,
        status,
        created_at,
    }
}

pub(super) fn store_config(transitions: TransitionPolicy) -> StoreConfig {
    StoreConfig {
        transitions,
        ..StoreConfig::immediate()
    }
}

pub(super) fn build_store() -> (ApplicationStore<InMemoryRepository>, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::default());
    let store = ApplicationStore::open(repository.clone(), StoreConfig::immediate());
    (store, repository)
}

pub(super) fn build_store_with(
    applications: &[LoanApplication],
    transitions: TransitionPolicy,
) -> (ApplicationStore<InMemoryRepository>, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::default());
    repository.save(applications).expect("seed repository");
    let store = ApplicationStore::open(repository.clone(), store_config(transitions));
    (store, repository)
}

/// Records every save and can be switched to fail.
#[derive(Default)]
pub(super) struct RecordingRepository {
    pub(super) saves: Mutex<Vec<Vec<LoanApplication>>>,
    pub(super) fail: bool,
}

impl RecordingRepository {
    pub(super) fn failing() -> Self {
        Self {
            saves: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(super) fn save_count(&self) -> usize {
        self.saves.lock().expect("saves mutex poisoned").len()
    }

    pub(super) fn last_saved(&self) -> Option<Vec<LoanApplication>> {
        self.saves
            .lock()
            .expect("saves mutex poisoned")
            .last()
            .cloned()
    }
}

impl ApplicationRepository for RecordingRepository {
    fn load(&self) -> Vec<LoanApplication> {
        Vec::new()
    }

    fn save(&self, applications: &[LoanApplication]) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.saves
            .lock()
            .expect("saves mutex poisoned")
            .push(applications.to_vec());
        Ok(())
    }
}

pub(super) fn router_with_store(store: ApplicationStore<InMemoryRepository>) -> axum::Router {
    application_router(Arc::new(store))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
