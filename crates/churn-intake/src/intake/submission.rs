use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::payload::build_payload;
use super::schema::{FormId, SchemaError};
use super::surface::{FormSurface, ResultFragment};
use super::transport::PredictionTransport;
use super::validation::FormValidator;
use super::values::RawFormValues;

/// Where a form is in its submit cycle. Terminal phases fall back to `Idle` as soon as the
/// result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Building,
    Sending,
    Succeeded,
    Failed,
}

/// Which stage produced a failed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    /// The payload builder rejected the values; nothing was sent.
    Payload,
    /// The request failed or the endpoint answered with an error.
    Transport,
}

/// What the user ends up seeing after a submission that reached the build phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    Succeeded {
        prediction: String,
    },
    Failed {
        message: String,
        origin: FailureOrigin,
    },
}

impl SubmissionResult {
    pub fn fragment(&self) -> ResultFragment {
        match self {
            SubmissionResult::Succeeded { prediction } => {
                ResultFragment::success(format!("Prediction: {prediction}"))
            }
            SubmissionResult::Failed { message, .. } => ResultFragment::error(message.clone()),
        }
    }
}

/// Return value of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The form id did not name a known form; nothing was validated.
    UnknownForm(SchemaError),
    /// A previous submission of the same form had not settled yet.
    Busy,
    /// Live validation failed or the form could not be located. No request was sent.
    Rejected,
    Completed(SubmissionResult),
}

/// Drives validate, build, send and render for both forms through one handler.
pub struct SubmissionController<S: ?Sized, T: ?Sized> {
    surface: Arc<S>,
    transport: Arc<T>,
    validator: FormValidator<S>,
    phases: Mutex<BTreeMap<FormId, SubmissionPhase>>,
}

impl<S, T> SubmissionController<S, T>
where
    S: FormSurface + ?Sized,
    T: PredictionTransport + ?Sized,
{
    pub fn new(surface: Arc<S>, transport: Arc<T>) -> Self {
        let validator = FormValidator::new(surface.clone());
        Self {
            surface,
            transport,
            validator,
            phases: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn validator(&self) -> &FormValidator<S> {
        &self.validator
    }

    pub fn phase(&self, form: FormId) -> SubmissionPhase {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&form)
            .copied()
            .unwrap_or(SubmissionPhase::Idle)
    }

    /// Handle a submit action. Button clicks and form submit events must both land here so
    /// a single user action never produces two requests.
    pub async fn submit(&self, form_id: &str) -> SubmissionOutcome {
        let (form, cycle) = match self.claim(form_id) {
            Ok(claimed) => claimed,
            Err(outcome) => return outcome,
        };

        let Some(raw) = self.surface.read_values(form) else {
            error!(%form, "form not found");
            return SubmissionOutcome::Rejected;
        };
        self.run(&cycle, form, &raw).await
    }

    /// Submit values that arrived with the action instead of reading them from the surface.
    /// Verdicts and the result still go to the surface.
    pub async fn submit_values(&self, form_id: &str, raw: &RawFormValues) -> SubmissionOutcome {
        let (form, cycle) = match self.claim(form_id) {
            Ok(claimed) => claimed,
            Err(outcome) => return outcome,
        };
        self.run(&cycle, form, raw).await
    }

    fn claim(&self, form_id: &str) -> Result<(FormId, PhaseGuard<'_>), SubmissionOutcome> {
        let form: FormId = form_id.parse().map_err(|err: SchemaError| {
            error!(%err, "submit requested for unknown form");
            SubmissionOutcome::UnknownForm(err)
        })?;

        let cycle = PhaseGuard::begin(&self.phases, form).ok_or_else(|| {
            debug!(%form, "submission already in flight; ignoring submit");
            SubmissionOutcome::Busy
        })?;
        Ok((form, cycle))
    }

    // Validation and the payload both work from the one snapshot in `raw`.
    async fn run(
        &self,
        cycle: &PhaseGuard<'_>,
        form: FormId,
        raw: &RawFormValues,
    ) -> SubmissionOutcome {
        let schema = form.schema();
        if !self.validator.validate_snapshot(schema, raw) {
            debug!(%form, "form validation failed");
            return SubmissionOutcome::Rejected;
        }

        cycle.advance(SubmissionPhase::Building);
        let payload = match build_payload(schema, raw) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%form, field = %err.field, reason = %err.reason, "payload rejected");
                let result = SubmissionResult::Failed {
                    message: err.reason,
                    origin: FailureOrigin::Payload,
                };
                return self.settle(cycle, form, result);
            }
        };

        cycle.advance(SubmissionPhase::Sending);
        let result = match self.transport.predict(schema.endpoint, &payload).await {
            Ok(response) => {
                info!(%form, prediction = %response.prediction, "prediction received");
                SubmissionResult::Succeeded {
                    prediction: response.prediction,
                }
            }
            Err(err) => {
                warn!(%form, %err, "prediction request failed");
                SubmissionResult::Failed {
                    message: err.user_message(),
                    origin: FailureOrigin::Transport,
                }
            }
        };

        self.settle(cycle, form, result)
    }

    fn settle(
        &self,
        cycle: &PhaseGuard<'_>,
        form: FormId,
        result: SubmissionResult,
    ) -> SubmissionOutcome {
        cycle.advance(match result {
            SubmissionResult::Succeeded { .. } => SubmissionPhase::Succeeded,
            SubmissionResult::Failed { .. } => SubmissionPhase::Failed,
        });
        self.surface.render_result(form, result.fragment());
        SubmissionOutcome::Completed(result)
    }
}

/// Claims a form for one submit cycle and returns it to `Idle` on every exit path.
struct PhaseGuard<'a> {
    phases: &'a Mutex<BTreeMap<FormId, SubmissionPhase>>,
    form: FormId,
}

impl<'a> PhaseGuard<'a> {
    fn begin(phases: &'a Mutex<BTreeMap<FormId, SubmissionPhase>>, form: FormId) -> Option<Self> {
        let mut guard = phases.lock().unwrap_or_else(PoisonError::into_inner);
        let current = guard.entry(form).or_insert(SubmissionPhase::Idle);
        if *current != SubmissionPhase::Idle {
            return None;
        }
        *current = SubmissionPhase::Validating;
        debug!(%form, phase = ?SubmissionPhase::Validating, "submission phase");
        Some(Self { phases, form })
    }

    fn advance(&self, phase: SubmissionPhase) {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.form, phase);
        debug!(form = %self.form, ?phase, "submission phase");
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.advance(SubmissionPhase::Idle);
    }
}
