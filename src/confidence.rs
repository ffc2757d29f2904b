//! Confidence scoring for an aggregation.
//!
//! Three normalized signals in [0,1]:
//! - `agreement`   : how closely the component scores agree
//! - `volume`      : how many samples back the readings (log-scaled)
//! - `reliability` : weight-averaged trust in the contributing sources
//!
//! confidence = 0.5*agreement + 0.3*volume + 0.2*reliability, floored at 0.10.

use serde::{Deserialize, Serialize};

use crate::aggregator::{SentimentAggregator, SourceReading, SourceScore, DEFAULT_RELIABILITY};
use crate::mood::NEUTRAL_SCORE;

pub const AGREEMENT_WEIGHT: f64 = 0.50;
pub const VOLUME_WEIGHT: f64 = 0.30;
pub const RELIABILITY_WEIGHT: f64 = 0.20;

/// Never report zero confidence.
pub const CONFIDENCE_FLOOR: f64 = 0.10;

pub const VOLUME_MIN_SAMPLES: u64 = 10;
pub const VOLUME_OPTIMAL_SAMPLES: u64 = 1000;

/// Largest variance of three points on [-1, 1] that we normalize against.
const MAX_VARIANCE: f64 = 0.667;
const EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_confidence(c: f64) -> Self {
        if c >= 0.90 {
            ConfidenceLevel::VeryHigh
        } else if c >= 0.75 {
            ConfidenceLevel::High
        } else if c >= 0.50 {
            ConfidenceLevel::Medium
        } else if c >= 0.25 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub confidence: f64,
    pub level: ConfidenceLevel,
    pub agreement: f64,
    pub volume: f64,
    pub reliability: f64,
}

impl SentimentAggregator {
    /// How far to trust `aggregate(readings)`. Pure, like `aggregate`.
    pub fn confidence(&self, readings: &[SourceReading]) -> Confidence {
        let components = self.components(readings);
        let samples: u64 = self
            .latest_by_source(readings)
            .values()
            .filter_map(|r| r.samples)
            .fold(0u64, u64::saturating_add);

        let agreement = agreement_score(&components);
        let volume = volume_score(samples);
        let reliability = reliability_score(self, &components);

        let raw = agreement * AGREEMENT_WEIGHT
            + volume * VOLUME_WEIGHT
            + reliability * RELIABILITY_WEIGHT;
        let confidence = raw.max(CONFIDENCE_FLOOR).min(1.0);

        Confidence {
            confidence,
            level: ConfidenceLevel::from_confidence(confidence),
            agreement,
            volume,
            reliability,
        }
    }
}

/// 1 when every component agrees, falling toward 0 as the spread grows.
pub fn agreement_score(components: &[SourceScore]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let unit: Vec<f64> = components
        .iter()
        .map(|c| (c.score - NEUTRAL_SCORE) / NEUTRAL_SCORE)
        .collect();
    let n = unit.len() as f64;
    let mean = unit.iter().sum::<f64>() / n;
    let variance = unit.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    (1.0 - variance / (MAX_VARIANCE + EPSILON)).clamp(0.0, 1.0)
}

/// Log-scaled sample volume: 10 → 0.5, 1000+ → 1.0, linear below 10.
pub fn volume_score(samples: u64) -> f64 {
    if samples == 0 {
        return 0.0;
    }
    if samples < VOLUME_MIN_SAMPLES {
        return samples as f64 / VOLUME_MIN_SAMPLES as f64 * 0.5;
    }
    if samples >= VOLUME_OPTIMAL_SAMPLES {
        return 1.0;
    }
    let log_n = (samples as f64).log10();
    let log_min = (VOLUME_MIN_SAMPLES as f64).log10();
    let log_opt = (VOLUME_OPTIMAL_SAMPLES as f64).log10();
    let normalized = (log_n - log_min) / (log_opt - log_min + EPSILON);
    0.5 + normalized * 0.5
}

fn reliability_score(agg: &SentimentAggregator, components: &[SourceScore]) -> f64 {
    let total_weight: f64 = components.iter().map(|c| c.weight).sum();
    if total_weight <= EPSILON {
        return DEFAULT_RELIABILITY;
    }
    components
        .iter()
        .map(|c| {
            let r = if c.defaulted {
                DEFAULT_RELIABILITY
            } else {
                agg.reliability_of(&c.source)
            };
            r * c.weight
        })
        .sum::<f64>()
        / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn volume_curve() {
        assert_eq!(volume_score(0), 0.0);
        assert!(approx(volume_score(5), 0.25));
        assert!(approx(volume_score(10), 0.5));
        assert!(approx(volume_score(100), 0.75));
        assert_eq!(volume_score(1000), 1.0);
        assert_eq!(volume_score(50_000), 1.0);
    }

    #[test]
    fn identical_scores_fully_agree() {
        let agg = SentimentAggregator::default();
        let readings = [
            SourceReading::new("stocks", 70.0),
            SourceReading::new("news", 70.0),
            SourceReading::new("social", 70.0),
        ];
        let c = agg.confidence(&readings);
        assert!(approx(c.agreement, 1.0));
        // no samples supplied
        assert_eq!(c.volume, 0.0);
        // 0.4*0.9 + 0.3*0.7 + 0.3*0.6
        assert!(approx(c.reliability, 0.75));
        assert!(approx(c.confidence, 0.5 + 0.2 * 0.75));
        assert_eq!(c.level, ConfidenceLevel::Medium);
    }

    #[test]
    fn disagreement_lowers_confidence() {
        let agg = SentimentAggregator::default();
        let calm = agg.confidence(&[
            SourceReading::new("stocks", 60.0),
            SourceReading::new("news", 62.0),
            SourceReading::new("social", 58.0),
        ]);
        let split = agg.confidence(&[
            SourceReading::new("stocks", 100.0),
            SourceReading::new("news", 50.0),
            SourceReading::new("social", 0.0),
        ]);
        assert!(split.agreement < calm.agreement);
        assert!(split.confidence < calm.confidence);
        assert!(approx(split.agreement, 0.0));
    }

    #[test]
    fn samples_raise_volume() {
        let agg = SentimentAggregator::default();
        let c = agg.confidence(&[
            SourceReading::new("stocks", 70.0).with_samples(600),
            SourceReading::new("news", 70.0).with_samples(400),
            SourceReading::new("social", 70.0),
        ]);
        assert_eq!(c.volume, 1.0);
        assert!(approx(c.confidence, 0.5 + 0.3 + 0.2 * 0.75));
        assert_eq!(c.level, ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn defaulted_sources_use_baseline_reliability() {
        let agg = SentimentAggregator::default();
        let c = agg.confidence(&[]);
        assert!(approx(c.reliability, DEFAULT_RELIABILITY));
        assert!(c.confidence >= CONFIDENCE_FLOOR);
    }

    #[test]
    fn floor_applies() {
        let agg = SentimentAggregator::new([("a", 0.5), ("b", 0.5)])
            .unwrap()
            .with_reliability([("a", 0.0), ("b", 0.0)])
            .unwrap();
        let c = agg.confidence(&[SourceReading::new("a", 0.0), SourceReading::new("b", 100.0)]);
        assert!(approx(c.agreement, 0.0));
        assert!(approx(c.confidence, CONFIDENCE_FLOOR));
        assert_eq!(c.level, ConfidenceLevel::VeryLow);
    }

    #[test]
    fn levels() {
        assert_eq!(ConfidenceLevel::from_confidence(0.95), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_confidence(0.75), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.25), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.1), ConfidenceLevel::VeryLow);
    }
}
