//! Statistical anomaly flags for an overall score.
//!
//! Three checks:
//! - z-score of the current score against recent history (spikes);
//! - spread between component scores (sources pulling in opposite directions);
//! - recent volatility against the rolling volatility of older history.
//!
//! Flags are informational. Nothing here changes the aggregate itself.

use serde::{Deserialize, Serialize};

use crate::aggregator::SourceScore;

pub const ZSCORE_THRESHOLD: f64 = 3.0;
pub const MIN_HISTORY: usize = 10;
/// Max tolerated spread between component scores, in score points.
pub const DIVERGENCE_THRESHOLD: f64 = 60.0;
/// Width of the recent and rolling windows used by the volatility check.
pub const VOLATILITY_WINDOW: usize = 5;

const EPSILON: f64 = 1e-8;

/// Ordered `Low < Medium < High`; `detect` reports the highest one raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    SuddenPositiveSpike,
    SuddenNegativeSpike,
    ModelDivergence,
    ExtremeVolatility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub is_anomaly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<AnomalyReason>,
    /// max - min of the component scores.
    pub spread: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// `None` with too little history or a flat history.
pub fn z_score(value: f64, history: &[f64]) -> Option<f64> {
    if history.len() < MIN_HISTORY {
        return None;
    }
    let sd = std_dev(history);
    if sd < EPSILON {
        return None;
    }
    Some((value - mean(history)) / sd)
}

pub fn severity(z: f64) -> Severity {
    let a = z.abs();
    if a >= 4.0 {
        Severity::High
    } else if a >= 3.5 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn spread(components: &[SourceScore]) -> f64 {
    let mut it = components.iter().map(|c| c.score);
    let Some(first) = it.next() else {
        return 0.0;
    };
    let (lo, hi) = it.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    hi - lo
}

/// Z-score of the std of the last `VOLATILITY_WINDOW` scores against the
/// rolling stds of the older history. `None` below `VOLATILITY_WINDOW +
/// MIN_HISTORY` points or when the older volatility never varies.
pub fn volatility_z(history: &[f64]) -> Option<f64> {
    if history.len() < VOLATILITY_WINDOW + MIN_HISTORY {
        return None;
    }
    let (older, recent) = history.split_at(history.len() - VOLATILITY_WINDOW);
    let rolling: Vec<f64> = older.windows(VOLATILITY_WINDOW).map(std_dev).collect();

    let sd = std_dev(&rolling);
    if sd < EPSILON {
        return None;
    }
    Some((std_dev(recent) - mean(&rolling)) / sd)
}

/// Evaluate `current` against `history` (oldest first, excluding `current`).
pub fn detect(current: f64, history: &[f64], components: &[SourceScore]) -> Anomaly {
    let z = z_score(current, history);
    let volatility_z = volatility_z(history);
    let spread = spread(components);

    let mut reasons = Vec::new();
    let mut sev: Option<Severity> = None;

    if let Some(z) = z {
        if z.abs() > ZSCORE_THRESHOLD {
            reasons.push(if z > 0.0 {
                AnomalyReason::SuddenPositiveSpike
            } else {
                AnomalyReason::SuddenNegativeSpike
            });
            sev = sev.max(Some(severity(z)));
        }
    }

    if spread > DIVERGENCE_THRESHOLD {
        reasons.push(AnomalyReason::ModelDivergence);
        sev = sev.max(Some(Severity::Medium));
    }

    // Only widening swings count; a calmer-than-usual stretch is not flagged.
    if let Some(vz) = volatility_z {
        if vz > ZSCORE_THRESHOLD {
            reasons.push(AnomalyReason::ExtremeVolatility);
            sev = sev.max(Some(severity(vz)));
        }
    }

    Anomaly {
        is_anomaly: !reasons.is_empty(),
        z_score: z,
        volatility_z,
        severity: sev,
        reasons,
        spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn comp(score: f64) -> SourceScore {
        SourceScore {
            source: Source::Stocks,
            score,
            weight: 1.0,
            defaulted: false,
        }
    }

    fn noisy_history() -> Vec<f64> {
        vec![60.0, 62.0, 58.0, 61.0, 59.0, 60.0, 63.0, 57.0, 60.0, 60.0]
    }

    #[test]
    fn needs_enough_history() {
        assert_eq!(z_score(90.0, &[60.0; 5]), None);
        assert_eq!(z_score(90.0, &[60.0; 12]), None, "flat history has no spread");
    }

    #[test]
    fn flags_positive_spike() {
        let a = detect(95.0, &noisy_history(), &[comp(95.0)]);
        assert!(a.is_anomaly);
        assert_eq!(a.reasons, vec![AnomalyReason::SuddenPositiveSpike]);
        assert_eq!(a.severity, Some(Severity::High));
    }

    #[test]
    fn flags_negative_spike() {
        let a = detect(20.0, &noisy_history(), &[comp(20.0)]);
        assert_eq!(a.reasons, vec![AnomalyReason::SuddenNegativeSpike]);
    }

    #[test]
    fn ordinary_score_is_quiet() {
        let a = detect(61.0, &noisy_history(), &[comp(61.0)]);
        assert!(!a.is_anomaly);
        assert!(a.severity.is_none());
        assert!(a.z_score.is_some());
    }

    #[test]
    fn divergence_flagged() {
        let a = detect(50.0, &[], &[comp(95.0), comp(50.0), comp(10.0)]);
        assert!(a.is_anomaly);
        assert_eq!(a.reasons, vec![AnomalyReason::ModelDivergence]);
        assert_eq!(a.spread, 85.0);
        assert_eq!(a.severity, Some(Severity::Medium));
    }

    #[test]
    fn reports_most_severe_flag() {
        let a = detect(95.0, &noisy_history(), &[comp(95.0), comp(50.0), comp(10.0)]);
        assert_eq!(
            a.reasons,
            vec![AnomalyReason::SuddenPositiveSpike, AnomalyReason::ModelDivergence]
        );
        assert_eq!(a.severity, Some(Severity::High));
    }

    fn calm_history(n: usize) -> Vec<f64> {
        (0..n).map(|i| [49.0, 50.0, 51.0, 50.5][i % 4]).collect()
    }

    #[test]
    fn flags_extreme_volatility() {
        let mut h = calm_history(15);
        h.extend([10.0, 90.0, 10.0, 90.0, 10.0]);

        let a = detect(50.0, &h, &[]);
        assert!(a.is_anomaly);
        assert_eq!(a.reasons, vec![AnomalyReason::ExtremeVolatility]);
        assert!(a.volatility_z.is_some_and(|vz| vz > ZSCORE_THRESHOLD));
        assert_eq!(a.severity, Some(Severity::High));
    }

    #[test]
    fn steady_swings_are_not_volatile() {
        let a = detect(50.0, &calm_history(20), &[]);
        assert!(!a.is_anomaly);
        assert!(a.volatility_z.is_some());
        assert_eq!(volatility_z(&calm_history(14)), None);
    }

    #[test]
    fn severity_bands() {
        assert_eq!(severity(3.2), Severity::Low);
        assert_eq!(severity(-3.6), Severity::Medium);
        assert_eq!(severity(4.0), Severity::High);
    }
}
