//! Router orchestrator: validate, classify, snapshot health, resolve, execute, record.

use crate::classifier::classify;
use crate::executor::{ExecuteParams, ProviderExecutor};
use crate::fallback::{execute_fallback_chain_with_cancel, FallbackOutcome, Sleep, TokioSleep};
use crate::health::{Clock, HealthTracker};
use crate::strategy::resolve_routes;
use gw_core::pricing::estimate_cost;
use gw_core::{
    HealthStatus, ResolvedRoute, Result, RouterConfig, RouterError, RouterProvider, RouterRequest, RouterResponse,
    RoutingAttempt, RoutingInfo,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Long-lived router. Safe to share (`Arc<Router>`) across concurrent
/// `complete` calls; the health tracker is its only mutable state.
pub struct Router {
    config: RouterConfig,
    health: HealthTracker,
    executor: Arc<dyn ProviderExecutor>,
    sleep: Arc<dyn Sleep>,
}

impl Router {
    /// Fails with `NoProvidersConfigured` on an empty provider map, or
    /// `InvalidConfig` on bad health parameters.
    pub fn new(config: RouterConfig, executor: Arc<dyn ProviderExecutor>) -> Result<Self> {
        config.validate()?;
        let health = HealthTracker::new(&config.health_check_or_default());
        Ok(Self {
            config,
            health,
            executor,
            sleep: Arc::new(TokioSleep),
        })
    }

    /// Replace the health time source. Discards any recorded history.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.health = HealthTracker::with_clock(&self.config.health_check_or_default(), clock);
        self
    }

    /// Replace the backoff sleep.
    pub fn with_sleep(mut self, sleep: Arc<dyn Sleep>) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub async fn complete(&self, request: RouterRequest) -> Result<RouterResponse> {
        self.complete_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`Router::complete`], but a triggered `cancel` skips any pending
    /// backoff and further attempts and yields `RouterError::Cancelled`.
    pub async fn complete_with_cancel(&self, request: RouterRequest, cancel: &CancellationToken) -> Result<RouterResponse> {
        if request.messages.is_empty() {
            return Err(RouterError::EmptyMessages);
        }

        let started = Instant::now();
        let complexity = classify(&request.messages);
        let health = self.health.all_statuses();
        let routes = resolve_routes(&request, &complexity, &self.config, &health);

        let attempt = |route: ResolvedRoute| {
            let executor = Arc::clone(&self.executor);
            let provider_config = self.config.providers.get(&route.provider).cloned();
            let params = ExecuteParams {
                model: route.model,
                messages: request.messages.clone(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            };
            let provider = route.provider;
            async move {
                let provider_config =
                    provider_config.ok_or_else(|| anyhow::anyhow!("Provider {} not configured", provider))?;
                executor.execute(provider, &provider_config, params).await
            }
        };

        let outcome = execute_fallback_chain_with_cancel(&routes, attempt, self.sleep.as_ref(), cancel).await;

        let FallbackOutcome { result, attempts } = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                self.record_attempts(err.attempts());
                return Err(err);
            }
        };
        self.record_attempts(&attempts);

        let estimated_cost_usd = result.usage.as_ref().and_then(|u| estimate_cost(&result.model, u));
        let total_latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            provider = %result.provider,
            model = %result.model,
            level = %complexity.level,
            attempts = attempts.len(),
            total_latency_ms,
            "request routed"
        );

        Ok(RouterResponse {
            content: result.content,
            model: result.model.clone(),
            provider: result.provider,
            usage: result.usage,
            routing: RoutingInfo {
                complexity,
                selected_model: result.model,
                selected_provider: result.provider,
                attempts,
                total_latency_ms,
                estimated_cost_usd,
            },
        })
    }

    pub fn health_status(&self, provider: RouterProvider) -> HealthStatus {
        self.health.status(provider)
    }

    /// Status of every provider that has ever been attempted.
    pub fn health_statuses(&self) -> BTreeMap<RouterProvider, HealthStatus> {
        self.health.all_statuses()
    }

    pub fn reset_health(&self, provider: Option<RouterProvider>) {
        self.health.reset(provider);
    }

    fn record_attempts(&self, attempts: &[RoutingAttempt]) {
        for a in attempts {
            self.health.record(a.provider, a.success);
        }
    }
}

/// Build a router with the default clock and sleep.
pub fn create_router(config: RouterConfig, executor: Arc<dyn ProviderExecutor>) -> Result<Router> {
    Router::new(config, executor)
}
