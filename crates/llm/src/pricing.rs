//! Cost Estimation
//!
//! Rough per-provider cost of a generation, in USD. Output is assumed to be
//! twice the input length.

use crate::types::ProviderKind;

/// USD per 1K tokens, `(input, output)`.
pub fn rates_per_1k(kind: ProviderKind) -> (f64, f64) {
    match kind {
        ProviderKind::OpenAI => (0.01, 0.03),
        ProviderKind::Gemini => (0.00025, 0.0005),
    }
}

/// Estimated cost for an input of `estimated_tokens`.
pub fn estimate_cost(estimated_tokens: u32, kind: ProviderKind) -> f64 {
    let (input, output) = rates_per_1k(kind);
    let tokens = f64::from(estimated_tokens);
    (tokens / 1000.0) * input + (tokens * 2.0 / 1000.0) * output
}
