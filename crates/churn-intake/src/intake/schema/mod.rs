mod catalog;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The two intake forms served by the prediction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormId {
    Bank,
    Telecom,
}

impl FormId {
    pub const fn ordered() -> [Self; 2] {
        [Self::Bank, Self::Telecom]
    }

    /// Identifier of the form container on the page.
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::Bank => "form1",
            Self::Telecom => "form2",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Telecom => "telecom",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bank => "Bank churn",
            Self::Telecom => "Telecom churn",
        }
    }

    /// Prediction endpoint path the form posts to.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Bank => "/api/bank-churn-prediction",
            Self::Telecom => "/api/telecom-churn-prediction",
        }
    }

    pub fn schema(self) -> &'static FormSchema {
        static BANK: OnceLock<FormSchema> = OnceLock::new();
        static TELECOM: OnceLock<FormSchema> = OnceLock::new();

        match self {
            Self::Bank => BANK.get_or_init(catalog::bank_form),
            Self::Telecom => TELECOM.get_or_init(catalog::telecom_form),
        }
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}

impl FromStr for FormId {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "form1" | "bank" | "bank-churn" => Ok(Self::Bank),
            "form2" | "telecom" | "telecom-churn" => Ok(Self::Telecom),
            _ => Err(SchemaError::UnknownForm(value.to_string())),
        }
    }
}

/// Resolve the schema for a form identifier such as `form1` or `telecom`.
pub fn schema_for(form_id: &str) -> Result<&'static FormSchema, SchemaError> {
    let form: FormId = form_id.parse()?;
    Ok(form.schema())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown form '{0}'")]
    UnknownForm(String),
}

/// Expected type of a field plus the constraints that only make sense for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean,
    Select {
        options: Vec<String>,
    },
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSchema {
    pub fn number(name: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self::required(name, FieldKind::Number { min, max })
    }

    pub fn boolean(name: &str) -> Self {
        Self::required(name, FieldKind::Boolean)
    }

    pub fn select(name: &str, options: &[&str]) -> Self {
        Self::required(
            name,
            FieldKind::Select {
                options: options.iter().map(|option| option.to_string()).collect(),
            },
        )
    }

    pub fn text(name: &str) -> Self {
        Self::required(name, FieldKind::Text)
    }

    fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Ordered, name-unique collection of field schemas for one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    pub form: FormId,
    pub endpoint: &'static str,
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    /// Build a schema; later declarations of a duplicate name replace earlier ones.
    pub fn new(form: FormId, fields: Vec<FieldSchema>) -> Self {
        let mut unique: Vec<FieldSchema> = Vec::with_capacity(fields.len());
        for field in fields {
            match unique.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => *existing = field,
                None => unique.push(field),
            }
        }

        Self {
            form,
            endpoint: form.endpoint(),
            fields: unique,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
