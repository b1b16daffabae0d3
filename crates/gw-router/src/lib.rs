//! LLM gateway router: complexity classification, health-aware route
//! resolution and sequential provider fallback.

pub mod classifier;
pub mod executor;
pub mod fallback;
pub mod health;
pub mod router;
pub mod strategy;
pub mod tiers;

pub use classifier::classify;
pub use executor::{ExecuteParams, ProviderExecutor, ProviderRegistry};
pub use fallback::{execute_fallback_chain, execute_fallback_chain_with_cancel, FallbackOutcome, Sleep, TokioSleep};
pub use health::{Clock, HealthTracker, SystemClock};
pub use router::{create_router, Router};
pub use strategy::resolve_routes;
pub use tiers::model_for_tier;

pub use gw_core;
pub use tokio_util::sync::CancellationToken;
