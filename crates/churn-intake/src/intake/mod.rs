//! Form intake: field schemas, validation, payload coercion, and the submission cycle.
//!
//! Presentation and prediction are collaborators behind [`FormSurface`] and
//! [`PredictionTransport`]; everything else here is pure and synchronous except the
//! request itself.

pub mod payload;
pub mod router;
pub mod schema;
pub mod submission;
pub mod surface;
pub mod transport;
pub mod validation;
pub mod values;

#[cfg(test)]
mod tests;

pub use payload::{build_payload, coerce_flag, PayloadError, TypedPayload, TypedValue};
pub use router::{intake_router, GatewayController, GatewaySurface};
pub use schema::{schema_for, FieldKind, FieldSchema, FormId, FormSchema, SchemaError};
pub use submission::{
    FailureOrigin, SubmissionController, SubmissionOutcome, SubmissionPhase, SubmissionResult,
};
pub use surface::{FormSurface, FragmentTone, ResultFragment};
pub use transport::{
    HttpPredictionTransport, PredictionResponse, PredictionTransport, TransportError,
};
pub use validation::{
    validate_field, validate_values, FieldReport, FieldVerdict, FormValidator, FormVerdict,
};
pub use values::RawFormValues;
