use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation turn. Order within a conversation is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: Role,
    pub content: String,
}

impl NormalizedMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Upstream LLM provider the router can dispatch to.
///
/// Declaration order is the natural provider order used when no fallback
/// chain is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterProvider {
    OpenAi,
    Anthropic,
}

impl RouterProvider {
    pub const ALL: [RouterProvider; 2] = [RouterProvider::OpenAi, RouterProvider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouterProvider::OpenAi => "openai",
            RouterProvider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for RouterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and endpoint for one provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: None }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// What a provider executor hands back for one successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub content: String,
    pub model: String,
    pub provider: RouterProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One candidate (provider, model) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub provider: RouterProvider,
    pub model: String,
}

impl ResolvedRoute {
    pub fn new(provider: RouterProvider, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }
}

/// Record of one executed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingAttempt {
    pub provider: RouterProvider,
    pub model: String,
    pub success: bool,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Condensed per-provider failure, as carried by `AllProvidersFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: RouterProvider,
    pub error: String,
}

/// Complexity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Simple => write!(f, "simple"),
            ComplexityLevel::Moderate => write!(f, "moderate"),
            ComplexityLevel::Complex => write!(f, "complex"),
        }
    }
}

/// Signals the classifier derives from a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexitySignals {
    pub token_count: usize,
    pub message_count: usize,
    pub has_system_prompt: bool,
    pub has_multi_turn: bool,
    /// In [0, 1].
    pub keyword_complexity: f64,
}

/// Classification result for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityResult {
    pub level: ComplexityLevel,
    pub signals: ComplexitySignals,
    /// In [0, 1].
    pub confidence: f64,
}

/// Point-in-time health of a provider over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub provider: RouterProvider,
    pub healthy: bool,
    pub success_rate: f64,
    pub total_requests: usize,
    /// Epoch millis.
    pub window_start: i64,
}

/// Inbound request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouterRequest {
    pub messages: Vec<NormalizedMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<RouterProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl RouterRequest {
    pub fn new(messages: Vec<NormalizedMessage>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_provider(mut self, provider: RouterProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Routing trace attached to every successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub complexity: ComplexityResult,
    pub selected_model: String,
    pub selected_provider: RouterProvider,
    pub attempts: Vec<RoutingAttempt>,
    /// Wall clock for the whole `complete` call.
    pub total_latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,
}

/// Outbound response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterResponse {
    pub content: String,
    pub model: String,
    pub provider: RouterProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub routing: RoutingInfo,
}
