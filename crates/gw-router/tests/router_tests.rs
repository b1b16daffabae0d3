use async_trait::async_trait;
use gw_router::gw_core::{
    CallResult, ComplexityLevel, HealthCheckConfig, NormalizedMessage, ProviderConfig, RouterConfig, RouterError,
    RouterErrorKind, RouterProvider, RouterRequest, RoutingConfig, RoutingStrategy, Usage,
};
use gw_router::{create_router, CancellationToken, Clock, ExecuteParams, ProviderExecutor, ProviderRegistry, Router, Sleep};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ========== Harness ==========

#[derive(Clone)]
enum Reply {
    Ok(&'static str),
    Fail(&'static str),
}

/// Scripted executor: one fixed reply per provider, every call recorded.
#[derive(Default)]
struct MockExecutor {
    replies: HashMap<RouterProvider, Reply>,
    calls: Mutex<Vec<(RouterProvider, ExecuteParams)>>,
}

impl MockExecutor {
    fn new(replies: &[(RouterProvider, Reply)]) -> Arc<Self> {
        Arc::new(Self { replies: replies.iter().cloned().collect(), calls: Mutex::default() })
    }

    fn calls(&self) -> Vec<(RouterProvider, ExecuteParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderExecutor for MockExecutor {
    async fn execute(&self, provider: RouterProvider, _config: &ProviderConfig, params: ExecuteParams) -> anyhow::Result<CallResult> {
        self.calls.lock().unwrap().push((provider, params.clone()));
        match self.replies.get(&provider) {
            Some(Reply::Ok(content)) => Ok(CallResult {
                content: content.to_string(),
                model: params.model,
                provider,
                usage: Some(Usage { input_tokens: 1_000, output_tokens: 500 }),
            }),
            Some(Reply::Fail(msg)) => Err(anyhow::anyhow!("{}", msg)),
            None => Err(anyhow::anyhow!("no reply scripted for {}", provider)),
        }
    }
}

struct NoSleep;

#[async_trait]
impl Sleep for NoSleep {
    async fn sleep(&self, _delay: Duration) {}
}

/// Fires the token on the first backoff and then waits forever.
struct CancelOnSleep(CancellationToken);

#[async_trait]
impl Sleep for CancelOnSleep {
    async fn sleep(&self, _delay: Duration) {
        self.0.cancel();
        std::future::pending::<()>().await;
    }
}

struct ManualClock(AtomicI64);

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn both_providers(strategy: RoutingStrategy) -> RouterConfig {
    RouterConfig::new(RoutingConfig::new(strategy))
        .with_provider(RouterProvider::OpenAi, ProviderConfig::new("sk-openai"))
        .with_provider(RouterProvider::Anthropic, ProviderConfig::new("sk-anthropic"))
}

fn router(config: RouterConfig, executor: Arc<MockExecutor>) -> Router {
    Router::new(config, executor)
        .unwrap()
        .with_sleep(Arc::new(NoSleep))
        .with_clock(Arc::new(ManualClock(AtomicI64::new(1_000_000))))
}

fn translate() -> RouterRequest {
    RouterRequest::new(vec![NormalizedMessage::user("Translate 'hello' to Spanish.")])
}

// ========== Construction ==========

#[test]
fn test_no_providers_rejected() {
    let config = RouterConfig::new(RoutingConfig::new(RoutingStrategy::Balanced));
    let err = create_router(config, MockExecutor::new(&[])).err().unwrap();
    assert_eq!(err.kind(), RouterErrorKind::NoProvidersConfigured);
}

#[test]
fn test_invalid_health_config_rejected() {
    let config = both_providers(RoutingStrategy::Balanced)
        .with_health_check(HealthCheckConfig { failure_threshold: 1.5, ..Default::default() });
    let err = create_router(config, MockExecutor::new(&[])).err().unwrap();
    assert_eq!(err.kind(), RouterErrorKind::InvalidConfig);
}

#[tokio::test]
async fn test_keyless_provider_accepted() {
    let config = RouterConfig::new(RoutingConfig::new(RoutingStrategy::Balanced))
        .with_provider(RouterProvider::OpenAi, ProviderConfig::new(""));
    let exec = MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("local"))]);
    let r = router(config, exec);
    let resp = r.complete(translate()).await.unwrap();
    assert_eq!(resp.content, "local");
}

#[test]
fn test_router_from_json_config() {
    let config = RouterConfig::from_json(
        r#"{
            "providers": { "anthropic": { "api_key": "sk-ant" } },
            "routing": { "strategy": "quality-first" }
        }"#,
    )
    .unwrap();
    let r = create_router(config, MockExecutor::new(&[])).unwrap();
    assert_eq!(r.config().routing.strategy, RoutingStrategy::QualityFirst);
}

// ========== Routing ==========

#[tokio::test]
async fn test_empty_messages_rejected() {
    let exec = MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("hi"))]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    let err = r.complete(RouterRequest::default()).await.unwrap_err();
    assert!(matches!(err, RouterError::EmptyMessages));
    assert!(exec.calls().is_empty());
    assert!(r.health_statuses().is_empty());
}

#[tokio::test]
async fn test_simple_request_uses_cheap_model() {
    let exec = MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("Hola"))]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    let resp = r.complete(translate()).await.unwrap();

    assert_eq!(resp.content, "Hola");
    assert_eq!(resp.provider, RouterProvider::OpenAi);
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.routing.complexity.level, ComplexityLevel::Simple);
    assert_eq!(resp.routing.selected_provider, RouterProvider::OpenAi);
    assert_eq!(resp.routing.selected_model, "gpt-4o-mini");
    assert_eq!(resp.routing.attempts.len(), 1);
    assert_eq!(exec.calls().len(), 1);
}

#[tokio::test]
async fn test_falls_back_to_second_provider() {
    let exec = MockExecutor::new(&[
        (RouterProvider::OpenAi, Reply::Fail("rate limited")),
        (RouterProvider::Anthropic, Reply::Ok("Hola")),
    ]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    let resp = r.complete(translate()).await.unwrap();

    assert_eq!(resp.provider, RouterProvider::Anthropic);
    assert_eq!(resp.model, "claude-haiku-4-5");
    let attempts = &resp.routing.attempts;
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].provider, RouterProvider::OpenAi);
    assert_eq!(attempts[0].model, "gpt-4o-mini");
    assert!(!attempts[0].success);
    assert_eq!(attempts[0].error.as_deref(), Some("rate limited"));
    assert!(attempts[1].success);

    let health = r.health_statuses();
    assert_eq!(health[&RouterProvider::OpenAi].success_rate, 0.0);
    assert_eq!(health[&RouterProvider::Anthropic].success_rate, 1.0);
}

#[tokio::test]
async fn test_all_providers_fail() {
    let exec = MockExecutor::new(&[
        (RouterProvider::OpenAi, Reply::Fail("rate limited")),
        (RouterProvider::Anthropic, Reply::Fail("overloaded")),
    ]);
    let r = router(both_providers(RoutingStrategy::Balanced), exec);
    let err = r.complete(translate()).await.unwrap_err();

    assert_eq!(err.kind(), RouterErrorKind::AllProvidersFailed);
    assert_eq!(err.to_string(), "All providers failed: openai: rate limited; anthropic: overloaded");
    assert_eq!(err.attempts().len(), 2);
    for p in RouterProvider::ALL {
        let s = r.health_status(p);
        assert_eq!(s.success_rate, 0.0);
        assert!(!s.healthy);
    }
}

#[tokio::test]
async fn test_explicit_provider_and_model_skips_routing() {
    let exec = MockExecutor::new(&[(RouterProvider::Anthropic, Reply::Fail("overloaded"))]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    let req = translate().with_provider(RouterProvider::Anthropic).with_model("claude-3-opus");
    let err = r.complete(req).await.unwrap_err();

    assert_eq!(err.attempts().len(), 1);
    let calls = exec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, RouterProvider::Anthropic);
    assert_eq!(calls[0].1.model, "claude-3-opus");
}

#[tokio::test]
async fn test_request_params_forwarded() {
    let exec = MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("ok"))]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    r.complete(translate().with_max_tokens(64).with_temperature(0.2)).await.unwrap();

    let (_, params) = &exec.calls()[0];
    assert_eq!(params.max_tokens, Some(64));
    assert_eq!(params.temperature, Some(0.2));
    assert_eq!(params.messages, translate().messages);
}

#[tokio::test]
async fn test_unconfigured_preferred_provider_fails_over() {
    let config = RouterConfig::new(RoutingConfig::new(RoutingStrategy::CostOptimized))
        .with_provider(RouterProvider::OpenAi, ProviderConfig::new("sk-openai"));
    let exec = MockExecutor::new(&[
        (RouterProvider::OpenAi, Reply::Ok("ok")),
        (RouterProvider::Anthropic, Reply::Ok("never")),
    ]);
    let r = router(config, exec.clone());
    let resp = r.complete(translate().with_provider(RouterProvider::Anthropic)).await.unwrap();

    assert_eq!(resp.provider, RouterProvider::OpenAi);
    let attempts = &resp.routing.attempts;
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].error.as_deref(), Some("Provider anthropic not configured"));
    assert_eq!(exec.calls().len(), 1);
}

#[tokio::test]
async fn test_unhealthy_provider_skipped_next_time() {
    let exec = MockExecutor::new(&[
        (RouterProvider::OpenAi, Reply::Fail("down")),
        (RouterProvider::Anthropic, Reply::Ok("ok")),
    ]);
    let r = router(both_providers(RoutingStrategy::CostOptimized), exec.clone());
    r.complete(translate()).await.unwrap();
    assert_eq!(exec.calls().len(), 2);

    let resp = r.complete(translate()).await.unwrap();
    assert_eq!(resp.routing.attempts.len(), 1);
    assert_eq!(resp.provider, RouterProvider::Anthropic);
    assert_eq!(exec.calls().len(), 3);

    r.reset_health(Some(RouterProvider::OpenAi));
    assert_eq!(r.health_status(RouterProvider::OpenAi).total_requests, 0);
    r.complete(translate()).await.unwrap();
    assert_eq!(exec.calls()[3].0, RouterProvider::OpenAi);
}

#[tokio::test]
async fn test_estimated_cost() {
    let exec = MockExecutor::new(&[(RouterProvider::Anthropic, Reply::Ok("ok"))]);
    let r = router(both_providers(RoutingStrategy::QualityFirst), exec);
    let resp = r.complete(translate().with_provider(RouterProvider::Anthropic)).await.unwrap();

    assert_eq!(resp.model, "claude-sonnet-4-5");
    // 1000 in @ $3/M + 500 out @ $15/M
    let cost = resp.routing.estimated_cost_usd.unwrap();
    assert!((cost - 0.0105).abs() < 1e-12);
}

#[tokio::test]
async fn test_cancel_during_backoff() {
    let cancel = CancellationToken::new();
    let exec = MockExecutor::new(&[
        (RouterProvider::OpenAi, Reply::Fail("timeout")),
        (RouterProvider::Anthropic, Reply::Ok("ok")),
    ]);
    let r = Router::new(both_providers(RoutingStrategy::Balanced), exec.clone())
        .unwrap()
        .with_sleep(Arc::new(CancelOnSleep(cancel.clone())));

    let err = r.complete_with_cancel(translate(), &cancel).await.unwrap_err();
    assert_eq!(err.kind(), RouterErrorKind::Cancelled);
    assert_eq!(err.attempts().len(), 1);
    assert_eq!(exec.calls().len(), 1);
    assert_eq!(r.health_status(RouterProvider::OpenAi).total_requests, 1);
    assert_eq!(r.health_status(RouterProvider::Anthropic).total_requests, 0);
}

#[tokio::test]
async fn test_concurrent_requests_share_health() {
    let exec = MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("ok"))]);
    let r = Arc::new(router(both_providers(RoutingStrategy::CostOptimized), exec.clone()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let r = Arc::clone(&r);
            tokio::spawn(async move { r.complete(translate()).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(exec.calls().len(), 16);
    let s = r.health_status(RouterProvider::OpenAi);
    assert_eq!(s.total_requests, 16);
    assert!(s.healthy);
}

#[tokio::test]
async fn test_registry_as_executor() {
    let registry = ProviderRegistry::new()
        .with(RouterProvider::OpenAi, MockExecutor::new(&[(RouterProvider::OpenAi, Reply::Ok("from registry"))]));
    let r = Router::new(both_providers(RoutingStrategy::CostOptimized), Arc::new(registry))
        .unwrap()
        .with_sleep(Arc::new(NoSleep));
    let resp = r.complete(translate()).await.unwrap();
    assert_eq!(resp.content, "from registry");
}
