use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::domain::LoanApplication;

/// Fixed key the application list is stored under.
pub const STORAGE_KEY: &str = "loanApplications";

/// Storage abstraction so the store can be exercised in isolation.
///
/// `load` never fails: absent or malformed data reads as an empty list.
pub trait ApplicationRepository: Send + Sync {
    fn load(&self) -> Vec<LoanApplication>;
    fn save(&self, applications: &[LoanApplication]) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository write failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize applications: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

fn decode(raw: &str, origin: &str) -> Vec<LoanApplication> {
    match serde_json::from_str::<Vec<LoanApplication>>(raw) {
        Ok(applications) => applications,
        Err(err) => {
            warn!(origin, error = %err, "persisted applications are malformed, starting empty");
            Vec::new()
        }
    }
}

/// Persists the list as a JSON document at `<data_dir>/loanApplications.json`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ApplicationRepository for JsonFileRepository {
    fn load(&self) -> Vec<LoanApplication> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted applications");
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read persisted applications");
                return Vec::new();
            }
        };

        let origin = self.path.display().to_string();
        let applications = decode(&raw, &origin);
        info!(path = %origin, applications = applications.len(), "loaded persisted applications");
        applications
    }

    fn save(&self, applications: &[LoanApplication]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        let content = serde_json::to_string_pretty(applications)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|source| self.io_error(source))?;
        fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))?;

        debug!(
            path = %self.path.display(),
            applications = applications.len(),
            "saved applications"
        );
        Ok(())
    }
}

/// Keeps the serialized list in memory, mirroring a single key-value slot.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    raw: Arc<Mutex<Option<String>>>,
}

impl InMemoryRepository {
    /// Seed the slot with arbitrary text, e.g. to exercise malformed data.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().expect("repository mutex poisoned").clone()
    }
}

impl ApplicationRepository for InMemoryRepository {
    fn load(&self) -> Vec<LoanApplication> {
        let guard = self.raw.lock().expect("repository mutex poisoned");
        match guard.as_deref() {
            Some(raw) => decode(raw, STORAGE_KEY),
            None => Vec::new(),
        }
    }

    fn save(&self, applications: &[LoanApplication]) -> Result<(), RepositoryError> {
        let content = serde_json::to_string(applications)?;
        *self.raw.lock().expect("repository mutex poisoned") = Some(content);
        Ok(())
    }
}
