use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::intake::payload::TypedPayload;
use crate::intake::schema::FormId;
use crate::intake::surface::{FormSurface, ResultFragment};
use crate::intake::transport::{PredictionResponse, PredictionTransport, TransportError};
use crate::intake::validation::FieldVerdict;
use crate::intake::values::RawFormValues;
use crate::intake::SubmissionController;

pub(super) fn bank_values() -> RawFormValues {
    RawFormValues::new()
        .with("tenure", "5")
        .with("monthly_charges", "70.5")
        .with("total_charges", "350")
        .with("paperless_billing", "1")
        .with("senior_citizen", "0")
        .with("streaming_tv", "1")
        .with("streaming_movies", "0")
        .with("multiple_lines", "0")
        .with("phone_service", "1")
        .with("device_protection", "0")
        .with("online_backup", "1")
        .with("partner", "1")
        .with("dependents", "0")
        .with("tech_support", "0")
        .with("online_security", "1")
        .with("gender", "Female")
        .with("contract", "Month-to-month")
        .with("internet_service", "Fiber optic")
        .with("payment_method", "Electronic check")
}

pub(super) fn telecom_values() -> RawFormValues {
    RawFormValues::new()
        .with("credit_score", "619")
        .with("age", "42")
        .with("tenure", "2")
        .with("balance", "0")
        .with("num_of_products", "1")
        .with("has_cr_card", "1")
        .with("is_active_member", "1")
        .with("estimated_salary", "101348.88")
        .with("satisfaction_score", "2")
        .with("point_earned", "464")
        .with("geography", "France")
        .with("gender", "Female")
        .with("card_type", "DIAMOND")
}

/// In-memory stand-in for the page: live values per form plus what was shown.
#[derive(Default)]
pub(super) struct MemorySurface {
    values: Mutex<HashMap<FormId, RawFormValues>>,
    verdicts: Mutex<HashMap<(FormId, String), FieldVerdict>>,
    results: Mutex<HashMap<FormId, ResultFragment>>,
    renders: Mutex<usize>,
}

impl MemorySurface {
    pub(super) fn with_form(form: FormId, values: RawFormValues) -> Self {
        let surface = Self::default();
        surface.set_values(form, values);
        surface
    }

    pub(super) fn set_values(&self, form: FormId, values: RawFormValues) {
        self.values
            .lock()
            .expect("values mutex poisoned")
            .insert(form, values);
    }

    pub(super) fn set_value(&self, form: FormId, field: &str, value: &str) {
        self.values
            .lock()
            .expect("values mutex poisoned")
            .entry(form)
            .or_default()
            .insert(field, value);
    }

    pub(super) fn values(&self, form: FormId) -> Option<RawFormValues> {
        self.values
            .lock()
            .expect("values mutex poisoned")
            .get(&form)
            .cloned()
    }

    pub(super) fn verdict(&self, form: FormId, field: &str) -> Option<FieldVerdict> {
        self.verdicts
            .lock()
            .expect("verdict mutex poisoned")
            .get(&(form, field.to_string()))
            .cloned()
    }

    pub(super) fn verdict_count(&self) -> usize {
        self.verdicts.lock().expect("verdict mutex poisoned").len()
    }

    pub(super) fn result(&self, form: FormId) -> Option<ResultFragment> {
        self.results
            .lock()
            .expect("result mutex poisoned")
            .get(&form)
            .cloned()
    }

    pub(super) fn renders(&self) -> usize {
        *self.renders.lock().expect("render mutex poisoned")
    }
}

impl FormSurface for MemorySurface {
    fn read_values(&self, form: FormId) -> Option<RawFormValues> {
        self.values(form)
    }

    fn show_field_verdict(&self, form: FormId, field: &str, verdict: &FieldVerdict) {
        self.verdicts
            .lock()
            .expect("verdict mutex poisoned")
            .insert((form, field.to_string()), verdict.clone());
    }

    fn render_result(&self, form: FormId, fragment: ResultFragment) {
        self.results
            .lock()
            .expect("result mutex poisoned")
            .insert(form, fragment);
        *self.renders.lock().expect("render mutex poisoned") += 1;
    }
}

/// Surface whose values change after the first read, like a page edited mid-submit.
pub(super) struct ShiftingSurface {
    form: FormId,
    first: RawFormValues,
    later: RawFormValues,
    reads: Mutex<usize>,
    pub(super) inner: MemorySurface,
}

impl ShiftingSurface {
    pub(super) fn new(form: FormId, first: RawFormValues, later: RawFormValues) -> Self {
        Self {
            form,
            first,
            later,
            reads: Mutex::new(0),
            inner: MemorySurface::default(),
        }
    }

    pub(super) fn reads(&self) -> usize {
        *self.reads.lock().expect("read mutex poisoned")
    }
}

impl FormSurface for ShiftingSurface {
    fn read_values(&self, form: FormId) -> Option<RawFormValues> {
        if form != self.form {
            return None;
        }
        let mut reads = self.reads.lock().expect("read mutex poisoned");
        *reads += 1;
        Some(if *reads == 1 {
            self.first.clone()
        } else {
            self.later.clone()
        })
    }

    fn show_field_verdict(&self, form: FormId, field: &str, verdict: &FieldVerdict) {
        self.inner.show_field_verdict(form, field, verdict);
    }

    fn render_result(&self, form: FormId, fragment: ResultFragment) {
        self.inner.render_result(form, fragment);
    }
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub(super) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<PredictionResponse, TransportError>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub(super) fn replying(prediction: &str) -> Self {
        let transport = Self::default();
        transport.push(Ok(PredictionResponse {
            prediction: prediction.to_string(),
        }));
        transport
    }

    pub(super) fn failing(err: TransportError) -> Self {
        let transport = Self::default();
        transport.push(Err(err));
        transport
    }

    pub(super) fn push(&self, response: Result<PredictionResponse, TransportError>) {
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .push_back(response);
    }

    pub(super) fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("request mutex poisoned").clone()
    }
}

#[async_trait]
impl PredictionTransport for ScriptedTransport {
    async fn predict(
        &self,
        endpoint: &str,
        payload: &TypedPayload,
    ) -> Result<PredictionResponse, TransportError> {
        let body = serde_json::to_value(payload).expect("payload serializes");
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push((endpoint.to_string(), body));
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

/// Transport that holds every request until the gate is opened.
#[derive(Default)]
pub(super) struct GatedTransport {
    pub(super) gate: Notify,
    pub(super) calls: Mutex<usize>,
}

#[async_trait]
impl PredictionTransport for GatedTransport {
    async fn predict(
        &self,
        _endpoint: &str,
        _payload: &TypedPayload,
    ) -> Result<PredictionResponse, TransportError> {
        *self.calls.lock().expect("call mutex poisoned") += 1;
        self.gate.notified().await;
        Ok(PredictionResponse {
            prediction: "Churned".to_string(),
        })
    }
}

pub(super) fn controller(
    surface: &Arc<MemorySurface>,
    transport: &Arc<ScriptedTransport>,
) -> SubmissionController<MemorySurface, ScriptedTransport> {
    SubmissionController::new(surface.clone(), transport.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
