//! Per-item usage volatility.
//!
//! An item is flagged when its latest usage sits more than
//! `HIGH_VOLATILITY_SIGMAS` population standard deviations away from the
//! mean of its usage history.

use crate::math::{mean, population_std_dev};
use crate::model::{HistoricalSnapshot, VolatilityMetrics};
use crate::thresholds::{HIGH_VOLATILITY_SIGMAS, MIN_USAGE_SAMPLES};

/// Compute volatility over the usage values of chronologically ordered
/// snapshots. Missing or non-finite usage is skipped.
///
/// Returns `None` with fewer than two usable samples; that means "not enough
/// history", not an error.
pub fn compute_volatility(snapshots: &[HistoricalSnapshot]) -> Option<VolatilityMetrics> {
    let usage: Vec<f64> = snapshots
        .iter()
        .filter_map(|s| s.usage)
        .filter(|u| u.is_finite())
        .collect();

    if usage.len() < MIN_USAGE_SAMPLES {
        return None;
    }

    let mean_usage = mean(&usage)?;
    let standard_deviation = population_std_dev(&usage);
    let current_usage = *usage.last()?;
    let is_high_volatility = standard_deviation
        .map(|sd| (current_usage - mean_usage).abs() > HIGH_VOLATILITY_SIGMAS * sd)
        .unwrap_or(false);

    Some(VolatilityMetrics {
        mean_usage,
        standard_deviation,
        current_usage,
        is_high_volatility,
        historical_usage: usage,
    })
}
