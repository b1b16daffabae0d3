//! Five-signal weighted complexity classifier.

use gw_core::tokens::estimate_tokens;
use gw_core::{ComplexityLevel, ComplexityResult, ComplexitySignals, NormalizedMessage, Role};
use regex::Regex;
use std::sync::LazyLock;

const SIMPLE_TOKEN_CEILING: usize = 500;
const COMPLEX_TOKEN_FLOOR: usize = 2000;
const MULTI_TURN_THRESHOLD: usize = 2;
const MAX_MESSAGES_FOR_SCORE: f64 = 10.0;

// Weights sum to 1.0.
const WEIGHT_TOKEN_COUNT: f64 = 0.35;
const WEIGHT_KEYWORD: f64 = 0.30;
const WEIGHT_MULTI_TURN: f64 = 0.15;
const WEIGHT_SYSTEM_PROMPT: f64 = 0.10;
const WEIGHT_MESSAGE_COUNT: f64 = 0.10;

pub const SIMPLE_THRESHOLD: f64 = 0.33;
pub const COMPLEX_THRESHOLD: f64 = 0.66;

pub(crate) const COMPLEX_PATTERNS: &[&str] = &[
    r"(?i)\banalyze\b",
    r"(?i)\bcompare\b",
    r"(?i)\bexplain\s+in\s+detail\b",
    r"(?i)\bstep[\s-]by[\s-]step\b",
    r"(?i)\bwrite\s+(?:a\s+)?(?:comprehensive|detailed)\b",
    r"(?i)\bcode\s+review\b",
    r"(?i)\brefactor\b",
    r"(?i)\barchitect(?:ure)?\b",
    r"(?i)\bdebug\b",
    r"(?i)\boptimize\b",
    r"(?i)\btrade[\s-]?offs?\b",
    r"(?i)\bpros?\s+and\s+cons?\b",
];

pub(crate) const SIMPLE_PATTERNS: &[&str] = &[
    r"(?i)\btranslate\b",
    r"(?i)\bsummarize\b",
    r"(?i)\blist\b",
    r"(?i)\byes\s+or\s+no\b",
    r"(?i)\btrue\s+or\s+false\b",
    r"(?i)\bclassify\b",
    r"(?i)\bextract\b",
    r"(?i)\bformat\b",
    r"(?i)\bconvert\b",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

pub(crate) static COMPLEX_KEYWORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(COMPLEX_PATTERNS));
pub(crate) static SIMPLE_KEYWORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SIMPLE_PATTERNS));

struct DimensionScore {
    name: &'static str,
    score: f64,
}

/// Classify a conversation. Pure and deterministic; empty input is `Simple`.
pub fn classify(messages: &[NormalizedMessage]) -> ComplexityResult {
    let signals = compute_signals(messages);
    let dimensions = score_dimensions(&signals);
    let score: f64 = dimensions.iter().map(|d| d.score).sum();
    let level = score_to_level(score);
    let confidence = confidence_for(score, level);

    let breakdown = dimensions
        .iter()
        .filter(|d| d.score > 0.0)
        .map(|d| format!("{}={:.2}", d.name, d.score))
        .collect::<Vec<_>>()
        .join(", ");
    tracing::debug!(
        level = %level,
        score,
        confidence,
        tokens = signals.token_count,
        dimensions = %breakdown,
        "classified conversation"
    );

    ComplexityResult { level, signals, confidence }
}

fn compute_signals(messages: &[NormalizedMessage]) -> ComplexitySignals {
    let all_content = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join(" ");
    let token_count = if messages.is_empty() { 0 } else { estimate_tokens(&all_content) };
    let non_system = messages.iter().filter(|m| m.role != Role::System).count();

    ComplexitySignals {
        token_count,
        message_count: messages.len(),
        has_system_prompt: messages.iter().any(|m| m.role == Role::System),
        has_multi_turn: non_system > MULTI_TURN_THRESHOLD,
        keyword_complexity: keyword_complexity(&all_content),
    }
}

/// `complex / (complex + simple)` over distinct keyword hits, 0 when nothing matches.
pub fn keyword_complexity(text: &str) -> f64 {
    let complex_hits = COMPLEX_KEYWORDS.iter().filter(|re| re.is_match(text)).count();
    let simple_hits = SIMPLE_KEYWORDS.iter().filter(|re| re.is_match(text)).count();
    let total = complex_hits + simple_hits;
    if total == 0 {
        return 0.0;
    }
    complex_hits as f64 / total as f64
}

fn score_token_count(tokens: usize) -> f64 {
    if tokens >= COMPLEX_TOKEN_FLOOR {
        WEIGHT_TOKEN_COUNT
    } else if tokens > SIMPLE_TOKEN_CEILING {
        let ratio = (tokens - SIMPLE_TOKEN_CEILING) as f64 / (COMPLEX_TOKEN_FLOOR - SIMPLE_TOKEN_CEILING) as f64;
        ratio * WEIGHT_TOKEN_COUNT
    } else {
        0.0
    }
}

fn flag(on: bool, weight: f64) -> f64 {
    if on { weight } else { 0.0 }
}

fn score_dimensions(signals: &ComplexitySignals) -> [DimensionScore; 5] {
    [
        DimensionScore { name: "tokenCount", score: score_token_count(signals.token_count) },
        DimensionScore { name: "keywords", score: signals.keyword_complexity * WEIGHT_KEYWORD },
        DimensionScore { name: "multiTurn", score: flag(signals.has_multi_turn, WEIGHT_MULTI_TURN) },
        DimensionScore { name: "systemPrompt", score: flag(signals.has_system_prompt, WEIGHT_SYSTEM_PROMPT) },
        DimensionScore {
            name: "messageCount",
            score: (signals.message_count as f64 / MAX_MESSAGES_FOR_SCORE).min(1.0) * WEIGHT_MESSAGE_COUNT,
        },
    ]
}

/// Raw weighted score in [0, 1] for a set of signals.
pub fn raw_score(signals: &ComplexitySignals) -> f64 {
    score_dimensions(signals).iter().map(|d| d.score).sum()
}

pub fn score_to_level(score: f64) -> ComplexityLevel {
    if score < SIMPLE_THRESHOLD {
        ComplexityLevel::Simple
    } else if score < COMPLEX_THRESHOLD {
        ComplexityLevel::Moderate
    } else {
        ComplexityLevel::Complex
    }
}

/// Distance from the nearest level boundary, normalised to [0, 1].
/// Moderate peaks at the middle of its band.
pub fn confidence_for(score: f64, level: ComplexityLevel) -> f64 {
    let raw = match level {
        ComplexityLevel::Simple => 1.0 - score / SIMPLE_THRESHOLD,
        ComplexityLevel::Complex => (score - COMPLEX_THRESHOLD) / (1.0 - COMPLEX_THRESHOLD),
        ComplexityLevel::Moderate => {
            let half_band = (COMPLEX_THRESHOLD - SIMPLE_THRESHOLD) / 2.0;
            (score - SIMPLE_THRESHOLD).min(COMPLEX_THRESHOLD - score) / half_band
        }
    };
    raw.clamp(0.0, 1.0)
}
