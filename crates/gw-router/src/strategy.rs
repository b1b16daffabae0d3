//! Route resolution: request + classification + config + health -> ordered routes.

use crate::tiers::model_for_tier;
use gw_core::{ComplexityResult, HealthStatus, ResolvedRoute, RouterConfig, RouterProvider, RouterRequest};
use std::collections::BTreeMap;

/// Resolve the ordered candidate routes for a request.
///
/// Never returns an empty list while `config.providers` is non-empty.
pub fn resolve_routes(
    request: &RouterRequest,
    complexity: &ComplexityResult,
    config: &RouterConfig,
    health: &BTreeMap<RouterProvider, HealthStatus>,
) -> Vec<ResolvedRoute> {
    // Caller opted out of routing.
    if let (Some(provider), Some(model)) = (request.provider, request.model.as_deref()) {
        return vec![ResolvedRoute::new(provider, model)];
    }

    let mut order = base_order(config);

    if let Some(preferred) = request.provider {
        order.retain(|p| *p != preferred);
        order.insert(0, preferred);
    }

    let healthy: Vec<RouterProvider> = order
        .iter()
        .copied()
        .filter(|p| health.get(p).map_or(true, |s| s.healthy))
        .collect();

    let candidates = if healthy.is_empty() {
        tracing::warn!(providers = ?order, "every candidate provider is unhealthy, ignoring health filter");
        order
    } else {
        healthy
    };

    let strategy = config.routing.strategy;
    let routes: Vec<ResolvedRoute> = candidates
        .into_iter()
        .map(|provider| {
            let model = match request.model.as_deref() {
                Some(m) => m.to_string(),
                None => model_for_tier(strategy, provider, complexity.level).to_string(),
            };
            ResolvedRoute { provider, model }
        })
        .collect();

    tracing::debug!(strategy = %strategy, level = %complexity.level, ?routes, "resolved routes");
    routes
}

/// Configured fallback chain (restricted to configured providers, deduplicated),
/// or the configured providers in natural order when there is no chain or
/// none of its entries are configured.
fn base_order(config: &RouterConfig) -> Vec<RouterProvider> {
    match config.routing.fallback_chain.as_deref() {
        Some(chain) if !chain.is_empty() => {
            let mut order = Vec::with_capacity(chain.len());
            for p in chain {
                if config.providers.contains_key(p) && !order.contains(p) {
                    order.push(*p);
                }
            }
            if order.is_empty() {
                config.provider_order()
            } else {
                order
            }
        }
        _ => config.provider_order(),
    }
}
