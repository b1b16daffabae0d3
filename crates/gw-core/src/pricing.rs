//! Per-model price table for cost estimates.

use crate::types::{RouterProvider, Usage};

/// USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub model: &'static str,
    pub provider: RouterProvider,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

const fn price(model: &'static str, provider: RouterProvider, input_per_1m: f64, output_per_1m: f64) -> ModelPricing {
    ModelPricing { model, provider, input_per_1m, output_per_1m }
}

pub const MODEL_PRICING: &[ModelPricing] = &[
    price("gpt-4o", RouterProvider::OpenAi, 2.5, 10.0),
    price("gpt-4o-mini", RouterProvider::OpenAi, 0.15, 0.6),
    price("gpt-4-turbo", RouterProvider::OpenAi, 10.0, 30.0),
    price("gpt-3.5-turbo", RouterProvider::OpenAi, 0.5, 1.5),
    price("o1", RouterProvider::OpenAi, 15.0, 60.0),
    price("o1-mini", RouterProvider::OpenAi, 3.0, 12.0),
    price("o3-mini", RouterProvider::OpenAi, 1.1, 4.4),
    price("claude-opus-4-5", RouterProvider::Anthropic, 15.0, 75.0),
    price("claude-sonnet-4-5", RouterProvider::Anthropic, 3.0, 15.0),
    price("claude-haiku-4-5", RouterProvider::Anthropic, 0.8, 4.0),
    price("claude-3-opus", RouterProvider::Anthropic, 15.0, 75.0),
    price("claude-3-sonnet", RouterProvider::Anthropic, 3.0, 15.0),
    price("claude-3-haiku", RouterProvider::Anthropic, 0.25, 1.25),
];

/// Look up pricing. Provider prefixes (`openai/gpt-4o`) are stripped.
pub fn pricing_for(model: &str) -> Option<&'static ModelPricing> {
    let id = model.rsplit_once('/').map(|(_, name)| name).unwrap_or(model);
    MODEL_PRICING.iter().find(|p| p.model == id)
}

/// Estimated USD cost of a call, `None` for unknown models.
pub fn estimate_cost(model: &str, usage: &Usage) -> Option<f64> {
    let p = pricing_for(model)?;
    let input = usage.input_tokens as f64 * p.input_per_1m / 1_000_000.0;
    let output = usage.output_tokens as f64 * p.output_per_1m / 1_000_000.0;
    Some(input + output)
}
