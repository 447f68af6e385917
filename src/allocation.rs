//! Allocation Planner.
//!
//! Turns per-zone strength and urgency into a distribution that favours the
//! weakest zone. Strength is `(health * damage) ^ (1 / urgency)`; strengths
//! are scaled by their mean, exponentiated, then reflected around the maximum
//! so the strongest zone gets nothing and the weakest gets the most. The
//! result is renormalized to sum to one.

use crate::constants::*;
use crate::urgency::*;
use crate::zones::*;

pub type AllocationDistribution = [f64; ZONE_COUNT];

pub const UNIFORM_ALLOCATION: AllocationDistribution = [1.0 / ZONE_COUNT as f64; ZONE_COUNT];

pub fn zone_strength(stat: &ZoneStat, urgency: f64) -> f64 {
    let base = stat.total_structure_health * stat.total_damage_potential;
    let score = if urgency > 0.0 {
        base.powf(1.0 / urgency)
    } else {
        base
    };
    if score.is_finite() {
        score
    } else {
        f64::MAX
    }
}

pub fn allocate(stats: &ZoneStats, urgency: &UrgencyVector) -> AllocationDistribution {
    let mut scores = [0.0; ZONE_COUNT];
    for (i, score) in scores.iter_mut().enumerate() {
        *score = zone_strength(&stats[i], urgency[i]);
    }

    let mean: f64 = scores.iter().map(|s| s / ZONE_COUNT as f64).sum();
    if !(mean > 0.0 && mean.is_finite()) {
        return UNIFORM_ALLOCATION;
    }

    for score in scores.iter_mut() {
        *score = (*score / mean).exp();
    }
    let max = scores.iter().copied().fold(f64::MIN, f64::max);
    for score in scores.iter_mut() {
        *score = (*score - max).abs();
    }

    let total: f64 = scores.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return UNIFORM_ALLOCATION;
    }
    for score in scores.iter_mut() {
        *score /= total;
    }
    scores
}

/// Split `budget` across zones according to `distribution`.
pub fn zone_budgets(budget: f64, distribution: &AllocationDistribution) -> [f64; ZONE_COUNT] {
    let mut out = [0.0; ZONE_COUNT];
    for (slot, share) in out.iter_mut().zip(distribution) {
        *slot = budget.max(0.0) * share;
    }
    out
}
