use thiserror::Error;

use crate::source::Source;

/// Raised when an aggregator is built from weights that break its invariants.
/// Only construction fails; `aggregate` and `classify` are total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no weighted sources configured")]
    NoSources,

    #[error("weight for '{channel}' must be within [0, 1], got {weight}")]
    WeightOutOfRange { channel: Source, weight: f64 },

    #[error("source '{channel}' is weighted more than once")]
    DuplicateSource { channel: Source },

    #[error("weights must sum to 1.0 (±{epsilon}), got {sum}")]
    WeightSum { sum: f64, epsilon: f64 },

    #[error("reliability for '{channel}' must be within [0, 1], got {value}")]
    ReliabilityOutOfRange { channel: Source, value: f64 },
}
