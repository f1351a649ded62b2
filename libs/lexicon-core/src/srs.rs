//! Spaced repetition scheduling.
//!
//! A word's schedule depends only on its review counters. Every review, from
//! any study flow, goes through [`apply_review`].

use crate::types::{MasteryTier, ReviewOutcome, ReviewStats};
use chrono::{DateTime, Duration, Utc};

/// Minimum accuracy for each tier above `New`.
pub const MASTERED_ACCURACY: f64 = 0.90;
pub const FAMILIAR_ACCURACY: f64 = 0.70;
pub const LEARNING_ACCURACY: f64 = 0.50;

/// Reviews required before a word can be `Mastered`.
pub const MASTERED_MIN_REVIEWS: u32 = 5;

/// Fraction of correct reviews. Defined as 0 when `review_count` is 0.
pub fn accuracy(review_count: u32, correct_count: u32) -> f64 {
    if review_count == 0 {
        0.0
    } else {
        f64::from(correct_count) / f64::from(review_count)
    }
}

/// Tier for the given counters. Rules are checked in order, first match wins.
pub fn classify(review_count: u32, correct_count: u32) -> MasteryTier {
    let accuracy = accuracy(review_count, correct_count);
    if accuracy >= MASTERED_ACCURACY && review_count >= MASTERED_MIN_REVIEWS {
        MasteryTier::Mastered
    } else if accuracy >= FAMILIAR_ACCURACY {
        MasteryTier::Familiar
    } else if accuracy >= LEARNING_ACCURACY {
        MasteryTier::Learning
    } else {
        MasteryTier::New
    }
}

/// Delay until the next review for a word in `tier`.
pub fn review_interval(tier: MasteryTier) -> Duration {
    match tier {
        MasteryTier::Mastered => Duration::days(30),
        MasteryTier::Familiar => Duration::days(7),
        MasteryTier::Learning => Duration::days(3),
        MasteryTier::New => Duration::days(1),
    }
}

/// Record one review and compute the next schedule.
pub fn apply_review(stats: &ReviewStats, outcome: ReviewOutcome, now: DateTime<Utc>) -> ReviewStats {
    let review_count = stats.review_count().saturating_add(1);
    let correct_count = if outcome.is_correct() {
        stats.correct_count().saturating_add(1)
    } else {
        stats.correct_count()
    };

    let tier = classify(review_count, correct_count);
    ReviewStats::from_transition(now + review_interval(tier), review_count, correct_count, tier)
}

/// A word is due once its next review date has been reached.
pub fn is_due(stats: &ReviewStats, now: DateTime<Utc>) -> bool {
    stats.next_review_date() <= now
}
