use serde::Serialize;

use super::schema::FormId;
use super::validation::FieldVerdict;
use super::values::RawFormValues;

/// Whether a rendered result reads as a success or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentTone {
    Success,
    Error,
}

/// The single result block shown under a form after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultFragment {
    pub tone: FragmentTone,
    pub text: String,
}

impl ResultFragment {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            tone: FragmentTone::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: FragmentTone::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone == FragmentTone::Error
    }
}

/// Presentation collaborator owning the live form controls and their messages.
///
/// Implementations must keep at most one message per field and one result fragment per
/// form: each call replaces whatever was shown before.
pub trait FormSurface: Send + Sync {
    /// Current values of the form's controls, or `None` when the form is not on the surface.
    fn read_values(&self, form: FormId) -> Option<RawFormValues>;
    fn show_field_verdict(&self, form: FormId, field: &str, verdict: &FieldVerdict);
    fn render_result(&self, form: FormId, fragment: ResultFragment);
}
