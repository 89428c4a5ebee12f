use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use churn_intake::intake::{intake_router, FormId, PredictionTransport};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct FormSummary {
    pub(crate) form: FormId,
    pub(crate) dom_id: &'static str,
    pub(crate) label: &'static str,
    pub(crate) endpoint: &'static str,
    pub(crate) field_count: usize,
}

pub(crate) fn with_intake_routes<T>(transport: Arc<T>) -> axum::Router
where
    T: PredictionTransport + 'static,
{
    intake_router(transport)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/forms", axum::routing::get(forms_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn forms_endpoint() -> Json<Vec<FormSummary>> {
    let forms = FormId::ordered()
        .into_iter()
        .map(|form| FormSummary {
            form,
            dom_id: form.dom_id(),
            label: form.label(),
            endpoint: form.endpoint(),
            field_count: form.schema().len(),
        })
        .collect();
    Json(forms)
}
