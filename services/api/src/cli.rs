use crate::console::{run_schema, run_submit, run_validate, FormArgs, SubmitArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use churn_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "churn-intake",
    about = "Validate and submit bank and telecom churn prediction forms",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the intake gateway (default command)
    Serve(ServeArgs),
    /// Print the field schema of a form (form1/bank or form2/telecom)
    Schema {
        /// Form identifier
        form: String,
    },
    /// Validate form values without submitting them
    Validate(FormArgs),
    /// Validate, coerce, and submit form values to the prediction backend
    Submit(SubmitArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Schema { form } => run_schema(&form),
        Command::Validate(args) => run_validate(args),
        Command::Submit(args) => run_submit(args).await,
    }
}
