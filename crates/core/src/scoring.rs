//! Scoring rules: accuracy and the qualitative tier shown on completion.

use serde::{Deserialize, Serialize};

/// Qualitative tier for a finished quiz, keyed by accuracy.
///
/// Lower bounds are inclusive and checked from the top down:
/// `>= 90%` Excellent, `>= 70%` Great, `>= 50%` `GoodEffort`, else `KeepLearning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreTier {
    Excellent,
    Great,
    GoodEffort,
    KeepLearning,
}

impl ScoreTier {
    /// Tier for `correct` out of `total`.
    ///
    /// Compared in integer space so that e.g. 9/10 lands exactly on the 90% bound.
    /// A zero `total` is treated as no accuracy.
    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        if total == 0 {
            return Self::KeepLearning;
        }
        let correct = correct.min(total);
        if correct * 10 >= total * 9 {
            Self::Excellent
        } else if correct * 10 >= total * 7 {
            Self::Great
        } else if correct * 2 >= total {
            Self::GoodEffort
        } else {
            Self::KeepLearning
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent! You're a master of this topic!",
            ScoreTier::Great => "Great job! You have a solid understanding.",
            ScoreTier::GoodEffort => "Good effort! Keep practicing to improve.",
            ScoreTier::KeepLearning => "Keep learning! Practice makes perfect.",
        }
    }
}

/// Fraction of correct answers, always within `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct.min(total) as f64 / total as f64
}

/// Accuracy as a whole percentage, rounded half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn accuracy_percent(correct: usize, total: usize) -> u8 {
    (accuracy(correct, total) * 100.0).round() as u8
}
