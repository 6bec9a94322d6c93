pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::EnhancerConfig;
pub use core::orchestrator::EnrichmentOrchestrator;
pub use domain::model::EnrichmentRequest;
pub use utils::error::{EnhancerError, ErrorBody, Result};
