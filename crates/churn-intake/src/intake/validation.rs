use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use super::schema::{schema_for, FieldKind, FieldSchema, FormSchema};
use super::surface::FormSurface;
use super::values::RawFormValues;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";
pub const VALID_MESSAGE: &str = "Valid";

/// Outcome of checking one value against its field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum FieldVerdict {
    Valid,
    Invalid(String),
}

impl FieldVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldVerdict::Valid)
    }

    /// Text shown next to the control.
    pub fn message(&self) -> &str {
        match self {
            FieldVerdict::Valid => VALID_MESSAGE,
            FieldVerdict::Invalid(reason) => reason,
        }
    }
}

/// Parse a trimmed decimal. Non-finite values are not numbers a form can submit.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Which side of a numeric range a value fell outside of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BoundViolation {
    BelowMin(f64),
    AboveMax(f64),
}

pub(crate) fn check_bounds(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), BoundViolation> {
    if let Some(min) = min {
        if value < min {
            return Err(BoundViolation::BelowMin(min));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(BoundViolation::AboveMax(max));
        }
    }
    Ok(())
}

/// Check one raw value. Rules short-circuit on the first failure.
pub fn validate_field(field: &FieldSchema, raw_value: &str) -> FieldVerdict {
    let value = raw_value.trim();

    if field.required && value.is_empty() {
        return FieldVerdict::Invalid(REQUIRED_MESSAGE.to_string());
    }

    if let FieldKind::Number { min, max } = &field.kind {
        if !value.is_empty() {
            let Some(number) = parse_number(value) else {
                return FieldVerdict::Invalid(INVALID_NUMBER_MESSAGE.to_string());
            };
            match check_bounds(number, *min, *max) {
                Err(BoundViolation::BelowMin(min)) => {
                    return FieldVerdict::Invalid(format!("Value must be at least {min}"));
                }
                Err(BoundViolation::AboveMax(max)) => {
                    return FieldVerdict::Invalid(format!("Value must be no more than {max}"));
                }
                Ok(()) => {}
            }
        }
    }

    FieldVerdict::Valid
}

/// Verdict for one field inside a form-wide scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub valid: bool,
    pub message: String,
}

/// Conjunction of every field verdict in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormVerdict {
    pub is_valid: bool,
    pub fields: Vec<FieldReport>,
}

impl FormVerdict {
    pub fn invalid_fields(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields.iter().filter(|report| !report.valid)
    }
}

/// Scan every schema field without short-circuiting. Absent values count as empty.
pub fn validate_values(schema: &FormSchema, raw: &RawFormValues) -> FormVerdict {
    let fields: Vec<FieldReport> = schema
        .fields()
        .map(|field| {
            let verdict = validate_field(field, raw.get(&field.name).unwrap_or_default());
            FieldReport {
                field: field.name.clone(),
                valid: verdict.is_valid(),
                message: verdict.message().to_string(),
            }
        })
        .collect();

    FormVerdict {
        is_valid: fields.iter().all(|report| report.valid),
        fields,
    }
}

/// Validates live forms through the presentation surface, updating every field message.
pub struct FormValidator<S: ?Sized> {
    surface: Arc<S>,
}

impl<S> FormValidator<S>
where
    S: FormSurface + ?Sized,
{
    pub fn new(surface: Arc<S>) -> Self {
        Self { surface }
    }

    /// Validate one field on blur/input and show its message.
    pub fn validate_live_field(&self, form_id: &str, field_name: &str) -> Option<FieldVerdict> {
        let schema = match schema_for(form_id) {
            Ok(schema) => schema,
            Err(err) => {
                error!(%err, "cannot validate field of unknown form");
                return None;
            }
        };
        let field = schema.field(field_name)?;
        let raw = self.surface.read_values(schema.form)?;
        let verdict = validate_field(field, raw.get(field_name).unwrap_or_default());
        self.surface.show_field_verdict(schema.form, field_name, &verdict);
        Some(verdict)
    }

    pub fn validate_form(&self, form_id: &str) -> bool {
        let schema = match schema_for(form_id) {
            Ok(schema) => schema,
            Err(err) => {
                error!(%err, "cannot validate unknown form");
                return false;
            }
        };
        let Some(raw) = self.surface.read_values(schema.form) else {
            error!(form = %schema.form, "form not found");
            return false;
        };
        self.validate_snapshot(schema, &raw)
    }

    /// Validate values already read from the surface, showing every field message.
    pub(crate) fn validate_snapshot(&self, schema: &FormSchema, raw: &RawFormValues) -> bool {
        let mut is_valid = true;
        for field in schema.fields() {
            let verdict = validate_field(field, raw.get(&field.name).unwrap_or_default());
            if !verdict.is_valid() {
                debug!(
                    form = %schema.form,
                    field = %field.name,
                    reason = verdict.message(),
                    "field rejected"
                );
                is_valid = false;
            }
            self.surface
                .show_field_verdict(schema.form, &field.name, &verdict);
        }

        is_valid
    }
}
