use crate::infra::build_transport;
use churn_intake::config::{AppConfig, PredictionConfig};
use churn_intake::error::AppError;
use churn_intake::intake::{
    schema_for, FieldKind, FieldSchema, FieldVerdict, FormId, FormSurface, FormValidator,
    FragmentTone, RawFormValues, ResultFragment, SubmissionController, SubmissionOutcome,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct FormArgs {
    /// Form identifier (form1/bank or form2/telecom)
    pub(crate) form: String,
    /// Field value as NAME=VALUE; repeat for every field
    #[arg(long = "value", value_parser = RawFormValues::parse_pair)]
    pub(crate) values: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    #[command(flatten)]
    pub(crate) form: FormArgs,
    /// Override the configured prediction backend base URL
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

/// Terminal rendition of a form: values come from the command line, messages go to stdout.
struct ConsoleSurface {
    form: FormId,
    values: RawFormValues,
}

impl ConsoleSurface {
    fn new(form: FormId, values: Vec<(String, String)>) -> Self {
        Self {
            form,
            values: values.into_iter().collect(),
        }
    }
}

impl FormSurface for ConsoleSurface {
    fn read_values(&self, form: FormId) -> Option<RawFormValues> {
        (form == self.form).then(|| self.values.clone())
    }

    fn show_field_verdict(&self, _form: FormId, field: &str, verdict: &FieldVerdict) {
        let marker = if verdict.is_valid() { "ok " } else { "ERR" };
        println!("  [{marker}] {field}: {}", verdict.message());
    }

    fn render_result(&self, form: FormId, fragment: ResultFragment) {
        match fragment.tone {
            FragmentTone::Success => println!("{} -> {}", form.label(), fragment.text),
            FragmentTone::Error => eprintln!("{} -> {}", form.label(), fragment.text),
        }
    }
}

fn describe(field: &FieldSchema) -> String {
    let kind = match &field.kind {
        FieldKind::Number { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("number {min}..={max}"),
            (Some(min), None) => format!("number >= {min}"),
            (None, Some(max)) => format!("number <= {max}"),
            (None, None) => "number".to_string(),
        },
        FieldKind::Boolean => "boolean (true/1 or 0)".to_string(),
        FieldKind::Select { options } => format!("one of: {}", options.join(" | ")),
        FieldKind::Text => "text".to_string(),
    };
    let required = if field.required { "required" } else { "optional" };
    format!("{} - {kind}, {required}", field.name)
}

pub(crate) fn run_schema(form_id: &str) -> Result<(), AppError> {
    let schema = schema_for(form_id)?;

    println!(
        "{} form ({}) -> POST {}",
        schema.form.label(),
        schema.form.dom_id(),
        schema.endpoint
    );
    for field in schema.fields() {
        println!("- {}", describe(field));
    }
    Ok(())
}

pub(crate) fn run_validate(args: FormArgs) -> Result<(), AppError> {
    let FormArgs { form, values } = args;
    let form_id: FormId = form.parse()?;

    let surface = Arc::new(ConsoleSurface::new(form_id, values));
    let validator = FormValidator::new(surface);

    println!("Validating {} form", form_id.label());
    if validator.validate_form(&form) {
        println!("Form is valid");
    } else {
        println!("Form has errors; submission would be blocked");
    }
    Ok(())
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let SubmitArgs {
        form: FormArgs { form, values },
        base_url,
    } = args;
    let form_id: FormId = form.parse()?;

    let config = AppConfig::load()?;
    let prediction = match base_url {
        Some(url) => PredictionConfig::new(url, config.prediction.timeout)?,
        None => config.prediction,
    };
    let transport = build_transport(&prediction)?;

    let surface = Arc::new(ConsoleSurface::new(form_id, values));
    let controller = SubmissionController::new(surface, transport);

    println!(
        "Submitting {} form to {}",
        form_id.label(),
        prediction.endpoint_url(form_id.endpoint())
    );
    match controller.submit(&form).await {
        SubmissionOutcome::Completed(_) => Ok(()),
        SubmissionOutcome::Rejected => {
            println!("Submission blocked: correct the fields marked ERR and try again");
            Ok(())
        }
        SubmissionOutcome::Busy => {
            println!("A submission for this form is already in flight");
            Ok(())
        }
        SubmissionOutcome::UnknownForm(err) => Err(err.into()),
    }
}
