//! # Sentiment Aggregator
//! Pure, testable logic that folds per-source scores into one overall score
//! and its mood. No I/O, no clock, no shared state.
//!
//! Policy:
//! - weights come from configuration and are validated once, at construction;
//! - scores are clamped to [0, 100] before weighting;
//! - a configured source missing from the call scores neutral (50) at its
//!   configured weight; weights are never renormalized;
//! - readings for unconfigured sources carry no weight;
//! - when a source repeats, the last reading wins.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::mood::{classify, clamp_score, MoodLabel, Tier, NEUTRAL_SCORE};
use crate::source::Source;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Reliability assumed for sources without a configured value, and for
/// components filled in by the neutral default.
pub const DEFAULT_RELIABILITY: f64 = 0.50;

/// One channel's score as supplied by the data-fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    pub source: Source,
    pub score: f64,
    /// How many samples back the score (articles, posts, quotes...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
}

impl SourceReading {
    pub fn new(source: impl Into<Source>, score: f64) -> Self {
        Self {
            source: source.into(),
            score,
            samples: None,
        }
    }

    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = Some(samples);
        self
    }
}

/// A weighted component of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceScore {
    pub source: Source,
    /// Clamped score actually used.
    pub score: f64,
    pub weight: f64,
    /// True when no reading was supplied and the neutral default was used.
    #[serde(default)]
    pub defaulted: bool,
}

impl SourceScore {
    pub fn weighted(&self) -> f64 {
        self.score * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub overall: u8,
    pub label: MoodLabel,
    pub tier: Tier,
    /// Breakdown in configuration order.
    pub components: Vec<SourceScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAggregator {
    weights: Vec<(Source, f64)>,
    reliability: BTreeMap<Source, f64>,
}

impl SentimentAggregator {
    /// Validate and build. Fails when there are no sources, a weight lies
    /// outside [0, 1], a source repeats, or the weights do not sum to 1.0.
    pub fn new<I, S>(weights: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Source>,
    {
        let mut out: Vec<(Source, f64)> = Vec::new();
        for (s, w) in weights {
            let source = s.into();
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(ConfigurationError::WeightOutOfRange {
                    channel: source,
                    weight: w,
                });
            }
            if out.iter().any(|(existing, _)| *existing == source) {
                return Err(ConfigurationError::DuplicateSource { channel: source });
            }
            out.push((source, w));
        }

        if out.is_empty() {
            return Err(ConfigurationError::NoSources);
        }

        let sum: f64 = out.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ConfigurationError::WeightSum {
                sum,
                epsilon: WEIGHT_EPSILON,
            });
        }

        Ok(Self {
            weights: out,
            reliability: default_reliability(),
        })
    }

    /// The dashboard's headline blend: stocks 40%, news 30%, social 30%.
    pub fn dashboard_default() -> Self {
        Self {
            weights: default_weights(),
            reliability: default_reliability(),
        }
    }

    /// Override source reliabilities (used by confidence scoring). Sources not
    /// listed keep their current value.
    pub fn with_reliability<I, S>(mut self, values: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Source>,
    {
        for (s, v) in values {
            let source = s.into();
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ConfigurationError::ReliabilityOutOfRange {
                    channel: source,
                    value: v,
                });
            }
            self.reliability.insert(source, v);
        }
        Ok(self)
    }

    pub fn weights(&self) -> &[(Source, f64)] {
        &self.weights
    }

    pub fn weight_of(&self, source: &Source) -> Option<f64> {
        self.weights
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, w)| *w)
    }

    pub fn reliability(&self) -> &BTreeMap<Source, f64> {
        &self.reliability
    }

    pub fn reliability_of(&self, source: &Source) -> f64 {
        self.reliability
            .get(source)
            .copied()
            .unwrap_or(DEFAULT_RELIABILITY)
    }

    /// Resolve readings against the configured weights: clamp, apply the
    /// neutral default, drop unconfigured sources.
    pub fn components(&self, readings: &[SourceReading]) -> Vec<SourceScore> {
        let latest = self.latest_by_source(readings);

        self.weights
            .iter()
            .map(|(source, weight)| match latest.get(source) {
                Some(r) => SourceScore {
                    source: source.clone(),
                    score: clamp_score(r.score),
                    weight: *weight,
                    defaulted: false,
                },
                None => SourceScore {
                    source: source.clone(),
                    score: NEUTRAL_SCORE,
                    weight: *weight,
                    defaulted: true,
                },
            })
            .collect()
    }

    /// Weighted overall score and its mood. Total; never fails.
    pub fn aggregate(&self, readings: &[SourceReading]) -> AggregateResult {
        let components = self.components(readings);
        let raw: f64 = components.iter().map(SourceScore::weighted).sum();
        let overall = clamp_score(raw.round()) as u8;
        let mood = classify(f64::from(overall));

        debug!(
            overall,
            label = %mood.label,
            defaulted = components.iter().filter(|c| c.defaulted).count(),
            "aggregated sentiment"
        );

        AggregateResult {
            overall,
            label: mood.label,
            tier: mood.tier,
            components,
        }
    }

    /// Last finite reading per configured source.
    pub(crate) fn latest_by_source<'a>(
        &self,
        readings: &'a [SourceReading],
    ) -> HashMap<&'a Source, &'a SourceReading> {
        let mut latest = HashMap::new();
        for r in readings {
            if r.score.is_nan() {
                debug!(source = %r.source, "ignoring NaN score");
                continue;
            }
            if self.weight_of(&r.source).is_none() {
                debug!(source = %r.source, "ignoring reading for unconfigured source");
                continue;
            }
            latest.insert(&r.source, r);
        }
        latest
    }
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::dashboard_default()
    }
}

pub(crate) fn default_weights() -> Vec<(Source, f64)> {
    vec![
        (Source::Stocks, 0.4),
        (Source::News, 0.3),
        (Source::Social, 0.3),
    ]
}

pub(crate) fn default_reliability() -> BTreeMap<Source, f64> {
    BTreeMap::from([
        (Source::Stocks, 0.90),
        (Source::News, 0.70),
        (Source::Social, 0.60),
    ])
}
