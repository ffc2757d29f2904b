//! # Trend
//! Momentum detection over a history of overall scores (0–100, oldest first).
//!
//! Compares a short and a long simple moving average: a short window running
//! above the long one is a bullish shift, below it a bearish shift. This is
//! shift detection, not forecasting.

use serde::{Deserialize, Serialize};

pub const SHORT_WINDOW: usize = 5;
pub const LONG_WINDOW: usize = 24;
pub const MIN_DATAPOINTS: usize = 3;

/// Minimum |short - long| (in score points) that counts as a shift.
pub const SHIFT_THRESHOLD: f64 = 5.0;
/// |delta| at which strength saturates to 1.
pub const STRONG_SHIFT: f64 = 12.5;

const MIDPOINT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    BullishShift,
    BearishShift,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub trend: TrendDirection,
    pub strength: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_term_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term_avg: Option<f64>,
    /// EMA over the whole history with the short window's span; reacts
    /// faster than `short_term_avg` to the latest scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_term_ema: Option<f64>,
    pub delta: f64,
}

impl Trend {
    fn stable() -> Self {
        Self {
            trend: TrendDirection::Stable,
            strength: 0.0,
            short_term_avg: None,
            long_term_avg: None,
            short_term_ema: None,
            delta: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumDirection {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub velocity: f64,
    pub acceleration: f64,
    pub direction: MomentumDirection,
}

/// Mean of the last `window` values, `None` if there are fewer.
pub fn moving_average(scores: &[f64], window: usize) -> Option<f64> {
    if window == 0 || scores.len() < window {
        return None;
    }
    let recent = &scores[scores.len() - window..];
    Some(recent.iter().sum::<f64>() / window as f64)
}

/// Exponential moving average seeded with the SMA of the first `window` values.
pub fn exponential_moving_average(scores: &[f64], window: usize) -> Option<f64> {
    if window == 0 || scores.len() < window {
        return None;
    }
    let k = 2.0 / (window as f64 + 1.0);
    let seed = scores[..window].iter().sum::<f64>() / window as f64;
    Some(
        scores[window..]
            .iter()
            .fold(seed, |ema, s| (s - ema) * k + ema),
    )
}

/// Strength in [0, 1]: 0 below the shift threshold, 1 at a strong shift.
pub fn trend_strength(delta: f64) -> f64 {
    let d = delta.abs();
    if d < SHIFT_THRESHOLD {
        0.0
    } else if d >= STRONG_SHIFT {
        1.0
    } else {
        (d - SHIFT_THRESHOLD) / (STRONG_SHIFT - SHIFT_THRESHOLD)
    }
}

pub fn detect_trend(history: &[f64]) -> Trend {
    if history.len() < MIN_DATAPOINTS {
        return Trend::stable();
    }

    let short_w = SHORT_WINDOW.min(history.len());
    let long_w = LONG_WINDOW.min(history.len());

    let (Some(short), Some(long)) = (
        moving_average(history, short_w),
        moving_average(history, long_w),
    ) else {
        return Trend::stable();
    };

    let delta = short - long;
    let trend = if delta.abs() < SHIFT_THRESHOLD {
        TrendDirection::Stable
    } else if delta > 0.0 {
        TrendDirection::BullishShift
    } else {
        TrendDirection::BearishShift
    };

    Trend {
        trend,
        strength: trend_strength(delta),
        short_term_avg: Some(short),
        long_term_avg: Some(long),
        short_term_ema: exponential_moving_average(history, short_w),
        delta,
    }
}

pub fn detect_momentum(history: &[f64]) -> Momentum {
    let n = history.len();
    if n < 2 {
        return Momentum {
            velocity: 0.0,
            acceleration: 0.0,
            direction: MomentumDirection::Flat,
        };
    }

    let velocity = history[n - 1] - history[n - 2];
    let acceleration = if n >= 3 {
        velocity - (history[n - 2] - history[n - 3])
    } else {
        0.0
    };

    let direction = if velocity.abs() < SHIFT_THRESHOLD / 2.0 {
        MomentumDirection::Flat
    } else if velocity > 0.0 {
        MomentumDirection::Rising
    } else {
        MomentumDirection::Falling
    };

    Momentum {
        velocity,
        acceleration,
        direction,
    }
}

/// True when `current` breaks sharply against the recent side of neutral.
pub fn is_reversal(history: &[f64], current: f64) -> bool {
    if history.len() < MIN_DATAPOINTS {
        return false;
    }
    let w = SHORT_WINDOW.min(history.len());
    let Some(recent) = moving_average(history, w) else {
        return false;
    };

    (recent > MIDPOINT && current < MIDPOINT - SHIFT_THRESHOLD)
        || (recent < MIDPOINT && current > MIDPOINT + SHIFT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_is_stable() {
        let t = detect_trend(&[40.0, 80.0]);
        assert_eq!(t.trend, TrendDirection::Stable);
        assert_eq!(t.strength, 0.0);
        assert!(t.short_term_avg.is_none());
        assert!(t.short_term_ema.is_none());
    }

    #[test]
    fn rising_scores_are_bullish() {
        let mut h: Vec<f64> = vec![50.0; 19];
        h.extend([65.0, 68.0, 70.0, 72.0, 75.0]);
        let t = detect_trend(&h);
        assert_eq!(t.trend, TrendDirection::BullishShift);
        assert!(t.delta > SHIFT_THRESHOLD);
        assert!(t.strength > 0.0);
        let ema = t.short_term_ema.expect("ema over a full history");
        assert!(ema > t.long_term_avg.unwrap());
    }

    #[test]
    fn falling_scores_are_bearish() {
        let mut h: Vec<f64> = vec![70.0; 19];
        h.extend([40.0, 38.0, 35.0, 33.0, 30.0]);
        let t = detect_trend(&h);
        assert_eq!(t.trend, TrendDirection::BearishShift);
        assert_eq!(t.strength, 1.0);
    }

    #[test]
    fn flat_scores_are_stable() {
        let t = detect_trend(&[60.0, 61.0, 59.0, 60.0, 62.0, 61.0]);
        assert_eq!(t.trend, TrendDirection::Stable);
    }

    #[test]
    fn strength_interpolates() {
        assert_eq!(trend_strength(4.9), 0.0);
        assert!((trend_strength(8.75) - 0.5).abs() < 1e-9);
        assert_eq!(trend_strength(-20.0), 1.0);
    }

    #[test]
    fn averages() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(moving_average(&[1.0], 2), None);
        let ema = exponential_moving_average(&[10.0, 10.0, 10.0, 20.0], 3).unwrap();
        assert!((ema - 15.0).abs() < 1e-9);
    }

    #[test]
    fn momentum_direction() {
        let m = detect_momentum(&[50.0, 52.0, 60.0]);
        assert_eq!(m.direction, MomentumDirection::Rising);
        assert_eq!(m.velocity, 8.0);
        assert_eq!(m.acceleration, 6.0);

        assert_eq!(detect_momentum(&[50.0]).direction, MomentumDirection::Flat);
        assert_eq!(detect_momentum(&[60.0, 59.0]).direction, MomentumDirection::Flat);
        assert_eq!(detect_momentum(&[60.0, 50.0]).direction, MomentumDirection::Falling);
    }

    #[test]
    fn reversal_detection() {
        assert!(is_reversal(&[70.0, 72.0, 68.0], 40.0));
        assert!(is_reversal(&[30.0, 35.0, 32.0], 60.0));
        assert!(!is_reversal(&[70.0, 72.0, 68.0], 48.0));
        assert!(!is_reversal(&[70.0, 72.0], 10.0));
    }
}
