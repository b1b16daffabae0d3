//! Shared data model, configuration and error taxonomy for the LLM gateway router.

pub mod config;
pub mod error;
pub mod pricing;
pub mod tokens;
pub mod types;

pub use config::{HealthCheckConfig, RouterConfig, RoutingConfig, RoutingStrategy};
pub use error::{Result, RouterError, RouterErrorKind};
pub use types::*;
