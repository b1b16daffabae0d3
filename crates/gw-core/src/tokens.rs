//! Token counting.
//!
//! `estimate_tokens` is an exact o200k BPE count. The chars/4 estimate is
//! kept as a cheap path and as the fallback if the encoding cannot load.

use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

/// Characters per token for the fast estimate.
pub const CHARS_PER_TOKEN: usize = 4;

static O200K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| match tiktoken_rs::o200k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::warn!(error = %e, "o200k encoding unavailable, using chars/4 token estimate");
        None
    }
});

/// Number of o200k BPE tokens in `text`.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match O200K.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => estimate_tokens_fast(text),
    }
}

/// `ceil(chars / 4)`. Counts chars, not bytes.
pub fn estimate_tokens_fast(text: &str) -> usize {
    estimate_tokens_from_chars(text.chars().count())
}

pub fn estimate_tokens_from_chars(char_count: usize) -> usize {
    char_count.div_ceil(CHARS_PER_TOKEN)
}
