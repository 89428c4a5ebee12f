mod cli;
mod console;
mod infra;
mod routes;
mod server;

use churn_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
