use chrono::NaiveDate;
use loan_intake::applications::{ApplicationStore, JsonFileRepository};
use loan_intake::config::AppConfig;
use loan_intake::error::AppError;
use loan_intake::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load configuration and install tracing for one-shot CLI commands.
pub(crate) fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn open_file_store(config: &AppConfig) -> Arc<ApplicationStore<JsonFileRepository>> {
    let repository = Arc::new(JsonFileRepository::new(&config.storage.data_dir));
    Arc::new(ApplicationStore::open(repository, config.store.clone()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number"))
}
