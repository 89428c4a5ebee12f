use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::intake::schema::{FormId, SchemaError};
use crate::intake::submission::{
    FailureOrigin, SubmissionController, SubmissionOutcome, SubmissionPhase, SubmissionResult,
};
use crate::intake::surface::{FragmentTone, ResultFragment};
use crate::intake::transport::{TransportError, CONNECTIVITY_MESSAGE};
use crate::intake::validation::FieldVerdict;

#[tokio::test]
async fn bank_submission_posts_typed_payload_and_renders_prediction() {
    let surface = Arc::new(MemorySurface::with_form(FormId::Bank, bank_values()));
    let transport = Arc::new(ScriptedTransport::replying("Not Churned"));
    let controller = controller(&surface, &transport);

    let outcome = controller.submit("form1").await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Completed(SubmissionResult::Succeeded {
            prediction: "Not Churned".to_string()
        })
    );
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let (endpoint, body) = &requests[0];
    assert_eq!(endpoint, "/api/bank-churn-prediction");
    assert_eq!(body["tenure"], json!(5));
    assert_eq!(body["monthly_charges"], json!(70.5));
    assert_eq!(body["paperless_billing"], json!(1));
    assert_eq!(body["contract"], json!("Month-to-month"));

    let fragment = surface.result(FormId::Bank).expect("result rendered");
    assert_eq!(fragment, ResultFragment::success("Prediction: Not Churned"));
    assert_eq!(controller.phase(FormId::Bank), SubmissionPhase::Idle);
}

#[tokio::test]
async fn invalid_telecom_form_is_blocked_before_the_network() {
    let surface = Arc::new(MemorySurface::with_form(
        FormId::Telecom,
        telecom_values().with("credit_score", "200"),
    ));
    let transport = Arc::new(ScriptedTransport::replying("Churned"));
    let controller = controller(&surface, &transport);

    let outcome = controller.submit("form2").await;

    assert_eq!(outcome, SubmissionOutcome::Rejected);
    assert!(transport.requests().is_empty());
    assert_eq!(
        surface.verdict(FormId::Telecom, "credit_score"),
        Some(FieldVerdict::Invalid("Value must be at least 300".to_string()))
    );
    assert!(surface.result(FormId::Telecom).is_none());
    assert_eq!(controller.phase(FormId::Telecom), SubmissionPhase::Idle);
}

#[tokio::test]
async fn payload_errors_render_without_sending() {
    let surface = Arc::new(MemorySurface::with_form(
        FormId::Telecom,
        telecom_values().with("geography", "Italy"),
    ));
    let transport = Arc::new(ScriptedTransport::replying("Churned"));
    let controller = controller(&surface, &transport);

    let outcome = controller.submit("telecom").await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Completed(SubmissionResult::Failed {
            message: "Invalid option for geography: Italy".to_string(),
            origin: FailureOrigin::Payload,
        })
    );
    assert!(transport.requests().is_empty());
    let fragment = surface.result(FormId::Telecom).expect("error rendered");
    assert_eq!(fragment.tone, FragmentTone::Error);
}

#[tokio::test]
async fn server_error_without_body_keeps_input_and_allows_retry() {
    let surface = Arc::new(MemorySurface::with_form(FormId::Bank, bank_values()));
    let transport = Arc::new(ScriptedTransport::failing(TransportError::Status {
        status: 500,
        status_text: String::new(),
        server_error: None,
    }));
    transport.push(Ok(crate::intake::PredictionResponse {
        prediction: "Churned".to_string(),
    }));
    let controller = controller(&surface, &transport);

    let first = controller.submit("form1").await;

    assert_eq!(
        first,
        SubmissionOutcome::Completed(SubmissionResult::Failed {
            message: CONNECTIVITY_MESSAGE.to_string(),
            origin: FailureOrigin::Transport,
        })
    );
    assert!(surface.result(FormId::Bank).expect("error shown").is_error());
    assert_eq!(surface.values(FormId::Bank), Some(bank_values()));
    assert_eq!(controller.phase(FormId::Bank), SubmissionPhase::Idle);

    let second = controller.submit("form1").await;

    assert_eq!(
        second,
        SubmissionOutcome::Completed(SubmissionResult::Succeeded {
            prediction: "Churned".to_string()
        })
    );
    assert_eq!(
        surface.result(FormId::Bank),
        Some(ResultFragment::success("Prediction: Churned"))
    );
    assert_eq!(surface.renders(), 2);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn server_provided_error_is_preferred() {
    let surface = Arc::new(MemorySurface::with_form(FormId::Bank, bank_values()));
    let transport = Arc::new(ScriptedTransport::failing(TransportError::Status {
        status: 400,
        status_text: "Bad Request".to_string(),
        server_error: Some("Missing required field: 'gender'".to_string()),
    }));
    let controller = controller(&surface, &transport);

    controller.submit("form1").await;

    assert_eq!(
        surface.result(FormId::Bank),
        Some(ResultFragment::error("Error: Missing required field: 'gender'"))
    );
}

#[tokio::test]
async fn unknown_and_missing_forms_do_nothing() {
    let surface = Arc::new(MemorySurface::default());
    let transport = Arc::new(ScriptedTransport::replying("Churned"));
    let controller = controller(&surface, &transport);

    assert_eq!(
        controller.submit("form7").await,
        SubmissionOutcome::UnknownForm(SchemaError::UnknownForm("form7".to_string()))
    );
    assert_eq!(controller.submit("form1").await, SubmissionOutcome::Rejected);
    assert!(transport.requests().is_empty());
    assert_eq!(surface.renders(), 0);
}

#[tokio::test]
async fn second_submit_while_sending_is_ignored() {
    let surface = Arc::new(MemorySurface::with_form(FormId::Bank, bank_values()));
    surface.set_values(FormId::Telecom, telecom_values());
    let transport = Arc::new(GatedTransport::default());
    let controller = SubmissionController::new(surface.clone(), transport.clone());

    let (first, (second, other_form)) = tokio::join!(controller.submit("form1"), async {
        let second = controller.submit("form1").await;
        let phase = controller.phase(FormId::Bank);
        transport.gate.notify_one();
        let other_form = controller.phase(FormId::Telecom);
        assert_eq!(phase, SubmissionPhase::Sending);
        (second, other_form)
    });

    assert_eq!(second, SubmissionOutcome::Busy);
    assert_eq!(other_form, SubmissionPhase::Idle);
    assert_eq!(
        first,
        SubmissionOutcome::Completed(SubmissionResult::Succeeded {
            prediction: "Churned".to_string()
        })
    );
    assert_eq!(*transport.calls.lock().expect("call mutex poisoned"), 1);
    assert_eq!(surface.renders(), 1);
    assert_eq!(controller.phase(FormId::Bank), SubmissionPhase::Idle);
}

#[tokio::test]
async fn submitted_payload_is_the_validated_snapshot() {
    let mut edited = bank_values();
    edited.remove("gender");
    edited.remove("tenure");
    let surface = Arc::new(ShiftingSurface::new(FormId::Bank, bank_values(), edited));
    let transport = Arc::new(ScriptedTransport::replying("Churned"));
    let controller = SubmissionController::new(surface.clone(), transport.clone());

    let outcome = controller.submit("form1").await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Completed(SubmissionResult::Succeeded {
            prediction: "Churned".to_string()
        })
    );
    assert_eq!(surface.reads(), 1);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1["gender"], json!("Female"));
    assert_eq!(requests[0].1["tenure"], json!(5));
}
