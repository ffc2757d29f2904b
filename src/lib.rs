// src/lib.rs
//! MoodMeter sentiment core: weighted aggregation of per-source scores into
//! one overall mood, plus the analytics the dashboard runs over it
//! (confidence, trend, anomaly) and a small HTTP surface.

pub mod aggregator;
pub mod anomaly;
pub mod confidence;
pub mod config;
pub mod error;
pub mod history;
pub mod mood;
pub mod source;
pub mod trend;

pub mod api;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{AggregateResult, SentimentAggregator, SourceReading, SourceScore};
pub use crate::api::{router, AppState};
pub use crate::confidence::{Confidence, ConfidenceLevel};
pub use crate::error::ConfigurationError;
pub use crate::mood::{classify, Mood, MoodLabel, Tier};
pub use crate::source::Source;
