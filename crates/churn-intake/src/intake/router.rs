use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::debug;

use super::schema::{schema_for, FormId, SchemaError};
use super::submission::{FailureOrigin, SubmissionController, SubmissionOutcome, SubmissionResult};
use super::surface::{FormSurface, ResultFragment};
use super::transport::PredictionTransport;
use super::validation::{validate_values, FieldVerdict};
use super::values::RawFormValues;

/// Submission controller shared by every request the router serves.
pub type GatewayController<T> = SubmissionController<GatewaySurface, T>;

/// Router exposing schema lookup, validation, and relayed submission for both forms.
///
/// One controller backs every submit request, so a form that is still sending answers
/// further submits with `409 Conflict`.
pub fn intake_router<T>(transport: Arc<T>) -> Router
where
    T: PredictionTransport + 'static,
{
    let controller = Arc::new(SubmissionController::new(Arc::new(GatewaySurface), transport));

    Router::new()
        .route("/api/v1/forms/:form_id/schema", get(schema_handler))
        .route("/api/v1/forms/:form_id/validate", post(validate_handler))
        .route("/api/v1/forms/:form_id/submit", post(submit_handler::<T>))
        .with_state(controller)
}

fn unknown_form(err: SchemaError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

pub(crate) async fn schema_handler(Path(form_id): Path<String>) -> Response {
    match schema_for(&form_id) {
        Ok(schema) => (StatusCode::OK, Json(schema)).into_response(),
        Err(err) => unknown_form(err),
    }
}

pub(crate) async fn validate_handler(
    Path(form_id): Path<String>,
    Json(values): Json<RawFormValues>,
) -> Response {
    let schema = match schema_for(&form_id) {
        Ok(schema) => schema,
        Err(err) => return unknown_form(err),
    };

    let verdict = validate_values(schema, &values);
    let payload = json!({
        "form": schema.form,
        "is_valid": verdict.is_valid,
        "fields": verdict.fields,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<T>(
    State(controller): State<Arc<GatewayController<T>>>,
    Path(form_id): Path<String>,
    Json(values): Json<RawFormValues>,
) -> Response
where
    T: PredictionTransport + 'static,
{
    let form: FormId = match form_id.parse() {
        Ok(form) => form,
        Err(err) => return unknown_form(err),
    };

    match controller.submit_values(form.dom_id(), &values).await {
        SubmissionOutcome::Completed(result) => {
            let text = result.fragment().text;
            match result {
                SubmissionResult::Succeeded { prediction } => {
                    let payload = json!({
                        "status": "succeeded",
                        "prediction": prediction,
                        "message": text,
                    });
                    (StatusCode::OK, Json(payload)).into_response()
                }
                SubmissionResult::Failed { message, origin } => {
                    let status = match origin {
                        FailureOrigin::Payload => StatusCode::UNPROCESSABLE_ENTITY,
                        FailureOrigin::Transport => StatusCode::BAD_GATEWAY,
                    };
                    let payload = json!({
                        "status": "failed",
                        "origin": origin,
                        "message": message,
                    });
                    (status, Json(payload)).into_response()
                }
            }
        }
        SubmissionOutcome::Rejected => {
            let verdict = validate_values(form.schema(), &values);
            let payload = json!({
                "status": "rejected",
                "fields": verdict.fields,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        SubmissionOutcome::Busy => {
            let payload = json!({ "status": "busy" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        SubmissionOutcome::UnknownForm(err) => unknown_form(err),
    }
}

/// Surface behind the gateway: values arrive with each request and verdicts go back in the
/// response body, so the surface itself only logs.
pub struct GatewaySurface;

impl FormSurface for GatewaySurface {
    fn read_values(&self, _form: FormId) -> Option<RawFormValues> {
        None
    }

    fn show_field_verdict(&self, form: FormId, field: &str, verdict: &FieldVerdict) {
        debug!(
            %form,
            field,
            valid = verdict.is_valid(),
            message = verdict.message(),
            "field verdict"
        );
    }

    fn render_result(&self, form: FormId, fragment: ResultFragment) {
        debug!(%form, error = fragment.is_error(), text = %fragment.text, "submission result");
    }
}
