use std::num::NonZeroU32;

use anyhow::Context;

/// Compute effective limit with precedence: local arg -> global flag -> fallback.
#[must_use]
pub fn effective_limit(local: Option<u32>, global: Option<u32>, fallback: u32) -> u32 {
    local.or(global).unwrap_or(fallback)
}

/// [`effective_limit`], rejecting zero.
pub fn nonzero_limit(
    local: Option<u32>,
    global: Option<u32>,
    fallback: u32,
) -> anyhow::Result<NonZeroU32> {
    NonZeroU32::new(effective_limit(local, global, fallback)).context("--limit must be at least 1")
}
