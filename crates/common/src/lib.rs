//! Shared building blocks for the clientes workspace: logging setup,
//! startup directory checks, Prometheus metrics and small response types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
