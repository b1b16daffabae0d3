//! Static (strategy, provider, complexity) -> model table.

use gw_core::{ComplexityLevel, RouterProvider, RoutingStrategy};

pub const GPT_4O: &str = "gpt-4o";
pub const GPT_4O_MINI: &str = "gpt-4o-mini";
pub const CLAUDE_SONNET: &str = "claude-sonnet-4-5";
pub const CLAUDE_HAIKU: &str = "claude-haiku-4-5";

/// Models for simple / moderate / complex, in that order.
pub type TierRow = [&'static str; 3];

/// One row per provider, in `RouterProvider` declaration order.
pub type StrategyTiers = [TierRow; 2];

/// Default tier table, indexed by `RoutingStrategy` declaration order.
///
/// `QualityFirst` pins each provider's top model. `Balanced` escalates at
/// moderate, `CostOptimized` only at complex.
pub const MODEL_TIERS: [StrategyTiers; 3] = [
    // cost-optimized
    [[GPT_4O_MINI, GPT_4O_MINI, GPT_4O], [CLAUDE_HAIKU, CLAUDE_HAIKU, CLAUDE_SONNET]],
    // quality-first
    [[GPT_4O, GPT_4O, GPT_4O], [CLAUDE_SONNET, CLAUDE_SONNET, CLAUDE_SONNET]],
    // balanced
    [[GPT_4O_MINI, GPT_4O, GPT_4O], [CLAUDE_HAIKU, CLAUDE_SONNET, CLAUDE_SONNET]],
];

/// Model identifier for a (strategy, provider, complexity) cell.
pub fn model_for_tier(strategy: RoutingStrategy, provider: RouterProvider, level: ComplexityLevel) -> &'static str {
    MODEL_TIERS[strategy as usize][provider as usize][level as usize]
}
