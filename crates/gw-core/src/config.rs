use crate::error::{Result, RouterError};
use crate::types::{ProviderConfig, RouterProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_WINDOW_SIZE_MS: u64 = 60_000;
pub const DEFAULT_MAX_WINDOW_ENTRIES: usize = 100;
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.5;

/// How aggressively the router trades cost for quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingStrategy {
    CostOptimized,
    QualityFirst,
    Balanced,
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingStrategy::CostOptimized => write!(f, "cost-optimized"),
            RoutingStrategy::QualityFirst => write!(f, "quality-first"),
            RoutingStrategy::Balanced => write!(f, "balanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub strategy: RoutingStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_chain: Option<Vec<RouterProvider>>,
}

impl RoutingConfig {
    pub fn new(strategy: RoutingStrategy) -> Self {
        Self { strategy, fallback_chain: None }
    }

    pub fn with_fallback_chain(mut self, chain: Vec<RouterProvider>) -> Self {
        self.fallback_chain = Some(chain);
        self
    }
}

/// Sliding-window parameters for provider health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub window_size_ms: u64,
    pub max_window_entries: usize,
    /// Failure rate at or above which a provider counts as unhealthy.
    pub failure_threshold: f64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            window_size_ms: DEFAULT_WINDOW_SIZE_MS,
            max_window_entries: DEFAULT_MAX_WINDOW_ENTRIES,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl HealthCheckConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size_ms == 0 {
            return Err(RouterError::InvalidConfig("health_check.window_size_ms must be > 0".into()));
        }
        if self.max_window_entries == 0 {
            return Err(RouterError::InvalidConfig("health_check.max_window_entries must be > 0".into()));
        }
        if !(self.failure_threshold > 0.0 && self.failure_threshold < 1.0) {
            return Err(RouterError::InvalidConfig(format!(
                "health_check.failure_threshold must be in (0, 1), got {}",
                self.failure_threshold
            )));
        }
        Ok(())
    }
}

/// Full router configuration. Read-only once handed to a router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub providers: BTreeMap<RouterProvider, ProviderConfig>,
    pub routing: RoutingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckConfig>,
}

impl RouterConfig {
    pub fn new(routing: RoutingConfig) -> Self {
        Self { providers: BTreeMap::new(), routing, health_check: None }
    }

    pub fn with_provider(mut self, provider: RouterProvider, config: ProviderConfig) -> Self {
        self.providers.insert(provider, config);
        self
    }

    pub fn with_health_check(mut self, health_check: HealthCheckConfig) -> Self {
        self.health_check = Some(health_check);
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Configured providers in natural order.
    pub fn provider_order(&self) -> Vec<RouterProvider> {
        self.providers.keys().copied().collect()
    }

    /// Effective health parameters (defaults when absent).
    pub fn health_check_or_default(&self) -> HealthCheckConfig {
        self.health_check.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(RouterError::NoProvidersConfigured);
        }
        if let Some(hc) = &self.health_check {
            hc.validate()?;
        }
        Ok(())
    }
}
