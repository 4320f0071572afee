//! Unified sampler construction.
//!
//! Both backends consume the same `{kind, value}` pair from the environment.
//! The rate computation is deliberately fail-to-zero: an unparsable value
//! samples nothing rather than everything.

use std::str::FromStr;

use opentelemetry_sdk::trace::Sampler;

use crate::observability::TracerError;

/// Declared sampler kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerKind {
    /// Sample everything or nothing, driven by the literal value `"true"`.
    Constant,
    /// Sample a ratio of traces, value parsed as a float in [0, 1].
    Probabilistic,
}

impl SamplerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplerKind::Constant => "CONSTANT",
            SamplerKind::Probabilistic => "PROBABILISTIC",
        }
    }
}

impl FromStr for SamplerKind {
    type Err = TracerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONSTANT" => Ok(SamplerKind::Constant),
            "PROBABILISTIC" => Ok(SamplerKind::Probabilistic),
            other => Err(TracerError::InvalidSamplerKind(other.to_string())),
        }
    }
}

/// Effective sampling rate for a kind/value pair.
///
/// Constant: the literal `"true"` means 1.0, anything else 0.0.
/// Probabilistic: parsed as f64, clamped to [0, 1]; unparsable or
/// non-finite values fall to 0.0.
pub fn sampling_rate(kind: SamplerKind, raw: &str) -> f64 {
    match kind {
        SamplerKind::Constant => {
            if raw == "true" {
                1.0
            } else {
                0.0
            }
        }
        SamplerKind::Probabilistic => match raw.parse::<f64>() {
            Ok(rate) if rate.is_finite() => rate.clamp(0.0, 1.0),
            _ => 0.0,
        },
    }
}

/// Translate the unified pair into the SDK's native sampler.
pub fn build_sampler(kind: SamplerKind, raw: &str) -> Sampler {
    let rate = sampling_rate(kind, raw);
    if rate >= 1.0 {
        Sampler::AlwaysOn
    } else if rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(rate)
    }
}
