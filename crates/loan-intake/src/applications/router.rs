use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::charts::{
    daily_trend, has_status_data, purpose_distribution, status_breakdown, PurposeShare,
    StatusSlice, TrendPoint,
};
use super::domain::{ApplicationId, StatusDecision};
use super::repository::ApplicationRepository;
use super::stats::DashboardStats;
use super::store::{ApplicationStore, StoreError};
use super::validation::FormInput;

/// Days covered by the dashboard trend series.
pub const TREND_DAYS: u32 = 7;

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: StatusDecision,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub rejection_rate: f64,
    pub has_status_data: bool,
    pub status_breakdown: Vec<StatusSlice>,
    pub trend: Vec<TrendPoint>,
    pub purposes: Vec<PurposeShare>,
}

/// Router builder exposing HTTP endpoints for intake, review, and the dashboard.
pub fn application_router<R>(store: Arc<ApplicationStore<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_handler::<R>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .with_state(store)
}

pub(crate) async fn submit_handler<R>(
    State(store): State<Arc<ApplicationStore<R>>>,
    form: Result<axum::Json<FormInput>, JsonRejection>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let axum::Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            let payload = json!({ "error": rejection.body_text() });
            return (rejection.status(), axum::Json(payload)).into_response();
        }
    };

    let submission = match form.into_submission() {
        Ok(submission) => submission,
        Err(errors) => {
            let payload = json!({ "errors": errors });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let application = store.submit(submission).await;
    (StatusCode::CREATED, axum::Json(application)).into_response()
}

pub(crate) async fn list_handler<R>(State(store): State<Arc<ApplicationStore<R>>>) -> Response
where
    R: ApplicationRepository + 'static,
{
    (StatusCode::OK, axum::Json(store.applications())).into_response()
}

pub(crate) async fn application_handler<R>(
    State(store): State<Arc<ApplicationStore<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match store.get(&id) {
        Some(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        None => store_error_response(StoreError::NotFound(id)),
    }
}

pub(crate) async fn status_handler<R>(
    State(store): State<Arc<ApplicationStore<R>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match store.update_status(&id, request.status) {
        Ok(update) => (StatusCode::OK, axum::Json(update)).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub(crate) async fn dashboard_handler<R>(State(store): State<Arc<ApplicationStore<R>>>) -> Response
where
    R: ApplicationRepository + 'static,
{
    let today = Utc::now().date_naive();
    let view = dashboard_view(&*store, today);
    (StatusCode::OK, axum::Json(view)).into_response()
}

/// Assemble the dashboard payload from a single consistent snapshot.
pub fn dashboard_view<R>(store: &ApplicationStore<R>, today: chrono::NaiveDate) -> DashboardView
where
    R: ApplicationRepository + 'static,
{
    let snapshot = store.snapshot();
    let status_breakdown = status_breakdown(&snapshot.stats);

    DashboardView {
        rejection_rate: snapshot.stats.rejection_rate(),
        has_status_data: has_status_data(&status_breakdown),
        status_breakdown,
        trend: daily_trend(&snapshot.applications, today, TREND_DAYS),
        purposes: purpose_distribution(&snapshot.applications),
        stats: snapshot.stats,
    }
}

fn store_error_response(error: StoreError) -> Response {
    let status = match error {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::TerminalStatus { .. } => StatusCode::CONFLICT,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
