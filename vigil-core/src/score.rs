//! Score reducers
//!
//! Pure functions over a snapshot of a user's signals. Every score lives on a 0-100 scale
//! where 100 means nothing worrying was found; missing data therefore reads as 100.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::signal::{BreachSignal, PasswordRating, SiteCheck};

pub const MAX_SCORE: f64 = 100.0;
pub const MIN_SCORE: f64 = 0.0;

pub const BREACH_WEIGHT: f64 = 0.4;
pub const WEBSITE_WEIGHT: f64 = 0.3;
pub const PASSWORD_WEIGHT: f64 = 0.3;

/// Flat deduction when any breach happened in the current calendar year.
pub const RECENT_BREACH_DEDUCTION: f64 = 15.0;
/// Ceiling for the breach-volume deduction.
pub const MAX_VOLUME_DEDUCTION: f64 = 10.0;

/// Deductions per exposed data type, applied once per tag regardless of how many breaches
/// expose it. Entries sharing a row count as one deduction.
const TAG_DEDUCTIONS: &[(&[&str], f64)] = &[
    (&["passwords"], 20.0),
    (&["email addresses"], 10.0),
    (&["phone numbers"], 5.0),
    (&["physical addresses", "geographic locations"], 5.0),
    (&["ip addresses"], 3.0),
    (&["names"], 2.0),
    (&["dates of birth"], 4.0),
    (&["spoken languages"], 1.0),
];

/// A score clamped to `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// The optimistic default used for missing data and failed sub-scores.
    pub const PERFECT: Score = Score(MAX_SCORE);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(MIN_SCORE);
        }
        Self(value.clamp(MIN_SCORE, MAX_SCORE))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn rounded(&self) -> u8 {
        // clamped to 0..=100 on construction
        self.0.round() as u8
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::PERFECT
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Breach score for all of a user's breach signals as of `current_year`.
pub fn breach_score(breaches: &[BreachSignal], current_year: i32) -> Score {
    let tags: BTreeSet<&str> = breaches
        .iter()
        .flat_map(|b| b.leaked_data.iter().map(String::as_str))
        .collect();

    let mut score = MAX_SCORE;

    for (names, deduction) in TAG_DEDUCTIONS {
        if names.iter().any(|name| tags.contains(name)) {
            score -= deduction;
        }
    }

    let count = breaches.len();
    if count > 1 {
        score -= (count as f64 * 2.0).min(MAX_VOLUME_DEDUCTION);
    }

    let recent = breaches
        .iter()
        .filter_map(|b| b.breach_year)
        .any(|year| current_year - year < 1);
    if recent {
        score -= RECENT_BREACH_DEDUCTION;
    }

    Score::new(score)
}

/// Website-safety score: the share of informative checks that came back malicious.
pub fn website_score(checks: &[SiteCheck]) -> Score {
    let valid: Vec<&SiteCheck> = checks.iter().filter(|c| c.has_data()).collect();
    if valid.is_empty() {
        return Score::PERFECT;
    }

    let malicious = valid.iter().filter(|c| c.malicious).count();
    let impact = malicious as f64 * 100.0 / valid.len() as f64;

    Score::new(MAX_SCORE - impact)
}

/// Password score: the mean stored rating, ignoring reserved pseudo-domains.
///
/// Ratings are rescaled to 0-100 when they are ingested, so they are averaged as stored.
pub fn password_score(ratings: &[PasswordRating]) -> Score {
    let selected: Vec<f64> = ratings
        .iter()
        .filter(|r| !r.is_reserved())
        .map(|r| r.rating)
        .collect();
    if selected.is_empty() {
        return Score::PERFECT;
    }

    Score::new(selected.iter().sum::<f64>() / selected.len() as f64)
}

/// Weighted 40/30/30 combination, rounded to the nearest whole point.
pub fn overall_score(breach: Score, website: Score, password: Score) -> Score {
    let weighted = breach.value() * BREACH_WEIGHT
        + website.value() * WEBSITE_WEIGHT
        + password.value() * PASSWORD_WEIGHT;
    Score::new(weighted.round())
}
