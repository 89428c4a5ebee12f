//! Schema-driven intake for the bank and telecom churn prediction forms.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
