//! Provider execution contract and the per-provider lookup table.

use async_trait::async_trait;
use gw_core::{CallResult, NormalizedMessage, ProviderConfig, RouterProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameters for a single provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteParams {
    pub model: String,
    pub messages: Vec<NormalizedMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Performs one call against an upstream provider.
///
/// Implementations must return an error rather than a partial result on any
/// transport or provider-side failure. The router only reads the error's
/// display text.
#[async_trait]
pub trait ProviderExecutor: Send + Sync {
    async fn execute(
        &self,
        provider: RouterProvider,
        config: &ProviderConfig,
        params: ExecuteParams,
    ) -> anyhow::Result<CallResult>;
}

/// Dispatches to one registered executor per provider.
///
/// New providers are added by registering an implementation.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    executors: HashMap<RouterProvider, Arc<dyn ProviderExecutor>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: RouterProvider, executor: Arc<dyn ProviderExecutor>) -> &mut Self {
        self.executors.insert(provider, executor);
        self
    }

    pub fn with(mut self, provider: RouterProvider, executor: Arc<dyn ProviderExecutor>) -> Self {
        self.register(provider, executor);
        self
    }

    pub fn get(&self, provider: RouterProvider) -> Option<&Arc<dyn ProviderExecutor>> {
        self.executors.get(&provider)
    }

    pub fn contains(&self, provider: RouterProvider) -> bool {
        self.executors.contains_key(&provider)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[async_trait]
impl ProviderExecutor for ProviderRegistry {
    async fn execute(
        &self,
        provider: RouterProvider,
        config: &ProviderConfig,
        params: ExecuteParams,
    ) -> anyhow::Result<CallResult> {
        let executor = self
            .executors
            .get(&provider)
            .ok_or_else(|| anyhow::anyhow!("no executor registered for provider {}", provider))?;
        executor.execute(provider, config, params).await
    }
}
