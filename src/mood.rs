//! # Mood classification
//!
//! Maps a 0–100 sentiment score to a mood label and its presentation tier.
//! One canonical table; every dashboard surface reads from it.
//!
//! Bands are lower-bound inclusive: 70 is `Bullish`, 69.99 is `Optimistic`.
//! Inputs outside [0, 100] are clamped first, so any number classifies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Neutral midpoint, also what a missing source scores.
pub const NEUTRAL_SCORE: f64 = 50.0;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    #[serde(rename = "Extremely Bullish")]
    ExtremelyBullish,
    Bullish,
    Optimistic,
    #[serde(rename = "Neutral (leaning positive)")]
    Neutral,
    Cautious,
    Bearish,
    #[serde(rename = "Very Bearish")]
    VeryBearish,
}

impl MoodLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            MoodLabel::ExtremelyBullish => "Extremely Bullish",
            MoodLabel::Bullish => "Bullish",
            MoodLabel::Optimistic => "Optimistic",
            MoodLabel::Neutral => "Neutral (leaning positive)",
            MoodLabel::Cautious => "Cautious",
            MoodLabel::Bearish => "Bearish",
            MoodLabel::VeryBearish => "Very Bearish",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color/severity bucket paired 1:1 with [`MoodLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    StrongPositive,
    Positive,
    MildPositive,
    Neutral,
    MildNegative,
    Negative,
    StrongNegative,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::StrongPositive => "strong-positive",
            Tier::Positive => "positive",
            Tier::MildPositive => "mild-positive",
            Tier::Neutral => "neutral",
            Tier::MildNegative => "mild-negative",
            Tier::Negative => "negative",
            Tier::StrongNegative => "strong-negative",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub label: MoodLabel,
    pub tier: Tier,
}

/// Canonical bands, highest first. The last band's floor is 0.
const BANDS: [(f64, MoodLabel, Tier); 7] = [
    (80.0, MoodLabel::ExtremelyBullish, Tier::StrongPositive),
    (70.0, MoodLabel::Bullish, Tier::Positive),
    (60.0, MoodLabel::Optimistic, Tier::MildPositive),
    (50.0, MoodLabel::Neutral, Tier::Neutral),
    (40.0, MoodLabel::Cautious, Tier::MildNegative),
    (30.0, MoodLabel::Bearish, Tier::Negative),
    (0.0, MoodLabel::VeryBearish, Tier::StrongNegative),
];

/// Clamp to [0, 100]. NaN maps to the neutral midpoint.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        NEUTRAL_SCORE
    } else {
        score.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// Classify any score into its mood. Total over `f64`.
pub fn classify(score: f64) -> Mood {
    let s = clamp_score(score);
    for (floor, label, tier) in BANDS {
        if s >= floor {
            return Mood { label, tier };
        }
    }
    // Unreachable after clamping; the lowest band has floor 0.
    Mood {
        label: MoodLabel::VeryBearish,
        tier: Tier::StrongNegative,
    }
}
