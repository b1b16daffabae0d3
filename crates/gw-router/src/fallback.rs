//! Sequential fallback across resolved routes with exponential backoff.
//!
//! Routes are tried strictly in order, one at a time. The first success
//! wins; every failure is recorded and, if another route remains, followed
//! by a jittered backoff sleep. No lock is held across any await here.

use async_trait::async_trait;
use gw_core::{CallResult, ResolvedRoute, RouterError, RoutingAttempt};
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub const BASE_DELAY_MS: u64 = 500;
pub const MAX_DELAY_MS: u64 = 5000;
pub const JITTER_FACTOR: f64 = 0.25;

/// Injectable backoff sleep.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Tokio timer sleep. Suspends only the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Successful chain result with the full attempt trace.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub result: CallResult,
    pub attempts: Vec<RoutingAttempt>,
}

/// Un-jittered delay for the `failed_attempts`-th retry: `min(500ms * 2^n, 5000ms)`.
pub fn base_delay_ms(failed_attempts: u32) -> u64 {
    BASE_DELAY_MS
        .saturating_mul(2u64.saturating_pow(failed_attempts))
        .min(MAX_DELAY_MS)
}

/// Backoff delay with uniform jitter in [-25%, +25%] of the base.
pub fn backoff_delay(failed_attempts: u32) -> Duration {
    let base = base_delay_ms(failed_attempts) as f64;
    let jitter = base * JITTER_FACTOR * rand::thread_rng().gen_range(-1.0..=1.0);
    Duration::from_millis((base + jitter).round().max(0.0) as u64)
}

/// Try each route until one succeeds.
///
/// Fails with `AllProvidersFailed` carrying every attempt once the last
/// route has failed.
pub async fn execute_fallback_chain<F, Fut>(
    routes: &[ResolvedRoute],
    attempt: F,
    sleep: &dyn Sleep,
) -> Result<FallbackOutcome, RouterError>
where
    F: FnMut(ResolvedRoute) -> Fut,
    Fut: Future<Output = anyhow::Result<CallResult>>,
{
    execute_fallback_chain_with_cancel(routes, attempt, sleep, &CancellationToken::new()).await
}

/// [`execute_fallback_chain`] that also stops at the next attempt or backoff
/// once `cancel` fires, returning `Cancelled` with the attempts made so far.
pub async fn execute_fallback_chain_with_cancel<F, Fut>(
    routes: &[ResolvedRoute],
    mut attempt: F,
    sleep: &dyn Sleep,
    cancel: &CancellationToken,
) -> Result<FallbackOutcome, RouterError>
where
    F: FnMut(ResolvedRoute) -> Fut,
    Fut: Future<Output = anyhow::Result<CallResult>>,
{
    let mut attempts: Vec<RoutingAttempt> = Vec::with_capacity(routes.len());

    for (i, route) in routes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(RouterError::Cancelled { attempts });
        }

        let start = Instant::now();
        match attempt(route.clone()).await {
            Ok(result) => {
                attempts.push(RoutingAttempt {
                    provider: route.provider,
                    model: route.model.clone(),
                    success: true,
                    latency_ms: elapsed_ms(start),
                    error: None,
                });
                return Ok(FallbackOutcome { result, attempts });
            }
            Err(err) => {
                let message = format!("{:#}", err);
                attempts.push(RoutingAttempt {
                    provider: route.provider,
                    model: route.model.clone(),
                    success: false,
                    latency_ms: elapsed_ms(start),
                    error: Some(message.clone()),
                });

                let Some(next) = routes.get(i + 1) else {
                    break;
                };

                let delay = backoff_delay(i as u32);
                tracing::warn!(
                    provider = %route.provider,
                    model = %route.model,
                    error = %message,
                    next_provider = %next.provider,
                    delay_ms = delay.as_millis() as u64,
                    "route failed, falling back"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RouterError::Cancelled { attempts }),
                    _ = sleep.sleep(delay) => {}
                }
            }
        }
    }

    tracing::error!(attempts = attempts.len(), "all routes failed");
    Err(RouterError::all_failed(attempts))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
