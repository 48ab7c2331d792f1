//! AI-assisted CV screening service: admit candidate documents, drive them
//! through a scoring oracle question by question, aggregate weighted
//! outcomes with exclusion filters, and expose filtering, sorting, and CSV
//! export over HTTP or the CLI.

pub mod config;
pub mod error;
pub mod oracle;
pub mod telemetry;
pub mod workflows;

mod cli;
mod routes;
mod screen;
mod server;

pub use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
