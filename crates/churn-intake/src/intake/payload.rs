use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use super::schema::{FieldKind, FormSchema};
use super::validation::{check_bounds, parse_number, BoundViolation};
use super::values::RawFormValues;

// Largest magnitude at which every integer is exactly representable as an f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A coerced form value ready for the prediction endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Number(f64),
    Flag(u8),
    Choice(String),
    Text(String),
}

impl Serialize for TypedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TypedValue::Number(value)
                if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER =>
            {
                serializer.serialize_i64(*value as i64)
            }
            TypedValue::Number(value) => serializer.serialize_f64(*value),
            TypedValue::Flag(flag) => serializer.serialize_u8(*flag),
            TypedValue::Choice(value) | TypedValue::Text(value) => serializer.serialize_str(value),
        }
    }
}

/// Field-to-value mapping sent as the request body, in form order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedPayload {
    entries: Vec<(String, TypedValue)>,
}

impl TypedPayload {
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, field: &str, value: TypedValue) {
        self.entries.push((field.to_string(), value));
    }
}

impl Serialize for TypedPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// First schema or type violation found while building a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct PayloadError {
    pub field: String,
    pub reason: String,
}

impl PayloadError {
    fn new(field: &str, reason: String) -> Self {
        Self {
            field: field.to_string(),
            reason,
        }
    }
}

/// `true` and `1` are the only truthy spellings; every other string is 0.
pub fn coerce_flag(raw: &str) -> u8 {
    match raw {
        "true" | "1" => 1,
        _ => 0,
    }
}

/// Re-walk raw values under the schema and coerce them, failing closed on the first
/// violation. Names the schema does not declare are skipped; required fields that are
/// absent altogether fail after every present value has been checked.
pub fn build_payload(
    schema: &FormSchema,
    raw_values: &RawFormValues,
) -> Result<TypedPayload, PayloadError> {
    let mut payload = TypedPayload::default();

    for (name, raw) in raw_values.iter() {
        let Some(field) = schema.field(name) else {
            warn!(form = %schema.form, field = name, "skipping value for undeclared field");
            continue;
        };

        let value = raw.trim();
        if value.is_empty() {
            if field.required {
                return Err(PayloadError::new(name, format!("{name} is required")));
            }
            continue;
        }

        let typed = match &field.kind {
            FieldKind::Number { min, max } => {
                let number = parse_number(value)
                    .ok_or_else(|| PayloadError::new(name, format!("{name} must be a number")))?;
                match check_bounds(number, *min, *max) {
                    Err(BoundViolation::BelowMin(min)) => {
                        return Err(PayloadError::new(
                            name,
                            format!("{name} must be at least {min}"),
                        ));
                    }
                    Err(BoundViolation::AboveMax(max)) => {
                        return Err(PayloadError::new(
                            name,
                            format!("{name} must be no more than {max}"),
                        ));
                    }
                    Ok(()) => TypedValue::Number(number),
                }
            }
            FieldKind::Boolean => TypedValue::Flag(coerce_flag(raw)),
            FieldKind::Select { options } => {
                if !options.iter().any(|option| option == raw) {
                    return Err(PayloadError::new(
                        name,
                        format!("Invalid option for {name}: {raw}"),
                    ));
                }
                TypedValue::Choice(raw.to_string())
            }
            FieldKind::Text => TypedValue::Text(raw.to_string()),
        };

        payload.push(name, typed);
    }

    if let Some(missing) = schema
        .fields()
        .find(|field| field.required && raw_values.get(&field.name).is_none())
    {
        let name = &missing.name;
        return Err(PayloadError::new(name, format!("{name} is required")));
    }

    Ok(payload)
}
