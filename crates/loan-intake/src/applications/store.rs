use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, LoanApplication, StatusDecision,
};
use super::repository::ApplicationRepository;
use super::stats::DashboardStats;
use crate::config::StoreConfig;

/// Capacity of the change notification channel; slow subscribers lose the oldest events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How the store treats a move between `approved` and `rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Refuse the change and leave the application untouched.
    #[default]
    Reject,
    /// Apply the change and log a warning.
    Warn,
    /// Apply the change silently.
    Allow,
}

impl TransitionPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            TransitionPolicy::Reject => "reject",
            TransitionPolicy::Warn => "warn",
            TransitionPolicy::Allow => "allow",
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(TransitionPolicy::Reject),
            "warn" => Ok(TransitionPolicy::Warn),
            "allow" => Ok(TransitionPolicy::Allow),
            other => Err(format!("unknown transition policy '{other}'")),
        }
    }
}

/// Consistent view of the list and the stats derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub applications: Vec<LoanApplication>,
    pub stats: DashboardStats,
}

/// Change notification; `stats` already reflects the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    Submitted {
        application: LoanApplication,
        stats: DashboardStats,
    },
    StatusChanged {
        application: LoanApplication,
        previous: ApplicationStatus,
        stats: DashboardStats,
    },
}

impl StoreEvent {
    pub fn application(&self) -> &LoanApplication {
        match self {
            StoreEvent::Submitted { application, .. }
            | StoreEvent::StatusChanged { application, .. } => application,
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        match self {
            StoreEvent::Submitted { stats, .. } | StoreEvent::StatusChanged { stats, .. } => stats,
        }
    }
}

/// Result of a status update. `changed` is false when the status was already the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub application: LoanApplication,
    pub previous_status: ApplicationStatus,
    pub changed: bool,
}

/// Error raised by store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {id} is already {} and cannot become {}", .current.label(), .requested.label())]
    TerminalStatus {
        id: ApplicationId,
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
}

struct StoreState {
    applications: Vec<LoanApplication>,
    stats: DashboardStats,
}

impl StoreState {
    fn new(applications: Vec<LoanApplication>) -> Self {
        let stats = DashboardStats::compute(&applications);
        Self {
            applications,
            stats,
        }
    }

    fn recompute(&mut self) {
        self.stats = DashboardStats::compute(&self.applications);
    }

    fn contains(&self, id: &ApplicationId) -> bool {
        self.applications.iter().any(|application| &application.id == id)
    }
}

/// Owner of the canonical application list and its derived statistics.
///
/// Every mutation updates the list, recomputes stats, persists, and notifies subscribers
/// while holding the state lock, so readers never observe a list without matching stats.
/// Persistence runs inline on the calling thread: a blocking repository such as
/// [`JsonFileRepository`](super::repository::JsonFileRepository) holds the lock for the write.
pub struct ApplicationStore<R> {
    repository: Arc<R>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    config: StoreConfig,
}

impl<R> ApplicationStore<R>
where
    R: ApplicationRepository + 'static,
{
    /// Load persisted applications (or start empty) and compute the initial stats.
    pub fn open(repository: Arc<R>, config: StoreConfig) -> Self {
        let applications = repository.load();
        let state = StoreState::new(applications);
        info!(
            applications = state.stats.total_applications,
            transitions = %config.transitions,
            "application store ready"
        );

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            repository,
            state: RwLock::new(state),
            events,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Applications in submission order, newest last.
    pub fn applications(&self) -> Vec<LoanApplication> {
        self.state
            .read()
            .expect("store lock poisoned")
            .applications
            .clone()
    }

    pub fn stats(&self) -> DashboardStats {
        self.state.read().expect("store lock poisoned").stats
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().expect("store lock poisoned");
        StoreSnapshot {
            applications: state.applications.clone(),
            stats: state.stats,
        }
    }

    pub fn get(&self, id: &ApplicationId) -> Option<LoanApplication> {
        self.state
            .read()
            .expect("store lock poisoned")
            .applications
            .iter()
            .find(|application| &application.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().expect("store lock poisoned").applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a new application. The caller is responsible for validation.
    ///
    /// Waits for the configured submit delay first; the application is invisible to
    /// readers until this future resolves.
    pub async fn submit(&self, submission: ApplicationSubmission) -> LoanApplication {
        if !self.config.submit_delay.is_zero() {
            tokio::time::sleep(self.config.submit_delay).await;
        }

        let mut state = self.state.write().expect("store lock poisoned");

        let mut id = ApplicationId::generate();
        while state.contains(&id) {
            id = ApplicationId::generate();
        }

        let application = LoanApplication::from_submission(id, submission, Utc::now());
        state.applications.push(application.clone());
        state.recompute();
        self.persist(&state.applications);

        info!(
            application_id = %application.id,
            loan_amount = application.loan_amount,
            purpose = application.purpose.key(),
            "application submitted"
        );

        self.publish(StoreEvent::Submitted {
            application: application.clone(),
            stats: state.stats,
        });

        application
    }

    /// Move an application to `approved` or `rejected`.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<StatusUpdate, StoreError> {
        let requested = decision.status();
        let mut state = self.state.write().expect("store lock poisoned");

        let Some(application) = state
            .applications
            .iter_mut()
            .find(|application| &application.id == id)
        else {
            warn!(application_id = %id, status = requested.label(), "status update for unknown application");
            return Err(StoreError::NotFound(id.clone()));
        };

        let previous = application.status;
        if previous == requested {
            return Ok(StatusUpdate {
                application: application.clone(),
                previous_status: previous,
                changed: false,
            });
        }

        if previous.is_terminal() {
            match self.config.transitions {
                TransitionPolicy::Reject => {
                    warn!(
                        application_id = %id,
                        from = previous.label(),
                        to = requested.label(),
                        "refusing to change a decided application"
                    );
                    return Err(StoreError::TerminalStatus {
                        id: id.clone(),
                        current: previous,
                        requested,
                    });
                }
                TransitionPolicy::Warn => warn!(
                    application_id = %id,
                    from = previous.label(),
                    to = requested.label(),
                    "overriding a decided application"
                ),
                TransitionPolicy::Allow => {}
            }
        }

        application.status = requested;
        let updated = application.clone();

        state.recompute();
        self.persist(&state.applications);

        info!(
            application_id = %id,
            from = previous.label(),
            to = requested.label(),
            "application status updated"
        );

        self.publish(StoreEvent::StatusChanged {
            application: updated.clone(),
            previous,
            stats: state.stats,
        });

        Ok(StatusUpdate {
            application: updated,
            previous_status: previous,
            changed: true,
        })
    }

    fn persist(&self, applications: &[LoanApplication]) {
        if let Err(err) = self.repository.save(applications) {
            error!(error = %err, "failed to persist applications, keeping in-memory state");
        }
    }

    fn publish(&self, event: StoreEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.events.send(event);
    }
}
