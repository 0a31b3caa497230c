use crate::cli::ServeArgs;
use crate::infra::{open_file_store, AppState};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_intake::applications::StoreEvent;
use loan_intake::config::AppConfig;
use loan_intake::error::AppError;
use loan_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_file_store(&config);
    info!(
        applications = store.len(),
        data_dir = %config.storage.data_dir.display(),
        transitions = %config.store.transitions,
        "application store opened"
    );
    tokio::spawn(log_store_events(store.subscribe()));

    let app = with_application_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Mirror store changes into the log so dashboards can follow along.
async fn log_store_events(mut events: broadcast::Receiver<StoreEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let stats = event.stats();
                debug!(
                    application_id = %event.application().id,
                    total = stats.total_applications,
                    pending = stats.pending_applications,
                    approval_rate = stats.approval_rate,
                    "dashboard statistics refreshed"
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "store event listener fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
