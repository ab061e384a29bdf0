//! Quartile boundary estimation — the second pipeline stage.
//!
//! Boundaries are computed independently per measure over the whole
//! customer population, using linear-interpolation quantiles: for n
//! sorted values and percentile p, the boundary interpolates between the
//! two values bracketing rank (n − 1) · p. The same method applies to all
//! three measures, so boundaries are reproducible and comparable.
//!
//! Boundaries are scoped to a single run. They are never persisted or
//! reused across datasets.

use crate::{
    error::{SegmentError, SegmentResult},
    measures::CustomerMeasures,
    types::Measure,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three boundary values splitting one measure's population into
/// quartile buckets. Invariant: q25 <= q50 <= q75.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuartileBands {
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
}

/// Per-measure quartile bands for a single run. Read-only once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuartileBoundaries {
    bands: HashMap<Measure, QuartileBands>,
}

impl QuartileBoundaries {
    /// Build boundaries from explicit per-measure bands. `estimate` is
    /// the normal constructor; this one serves callers that bring their
    /// own bands.
    pub fn from_bands(bands: HashMap<Measure, QuartileBands>) -> Self {
        Self { bands }
    }

    /// Bands for one measure.
    ///
    /// Fails with `UnknownMeasure` when the map has no entry — the
    /// grading stage guards its own contract instead of trusting that
    /// upstream filled all three measures.
    pub fn bands_for(&self, measure: Measure) -> SegmentResult<&QuartileBands> {
        self.bands
            .get(&measure)
            .ok_or(SegmentError::UnknownMeasure {
                measure: measure.name().to_string(),
            })
    }
}

/// Compute quartile boundaries for all three measures.
///
/// Guards the empty population independently of the aggregation stage:
/// this function may be handed a subset.
pub fn estimate(measures: &[CustomerMeasures]) -> SegmentResult<QuartileBoundaries> {
    if measures.is_empty() {
        return Err(SegmentError::InsufficientPopulation);
    }

    let mut bands = HashMap::new();
    for measure in Measure::ALL {
        let mut values: Vec<f64> = measures.iter().map(|m| m.measure(measure)).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let band = QuartileBands {
            q25: interpolated_quantile(&values, 0.25),
            q50: interpolated_quantile(&values, 0.50),
            q75: interpolated_quantile(&values, 0.75),
        };
        log::debug!(
            "quartiles: {} q25={:.2} q50={:.2} q75={:.2}",
            measure.name(),
            band.q25,
            band.q50,
            band.q75
        );
        bands.insert(measure, band);
    }

    Ok(QuartileBoundaries { bands })
}

/// Linear-interpolation quantile over already-sorted values.
///
/// rank = (n − 1) · p; the result interpolates between the two values
/// bracketing that rank. Duplicate values keep their duplicate ranks. A
/// single-element slice collapses every quantile onto that element.
fn interpolated_quantile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_bracketing_values() {
        let values = [0.0, 10.0];
        assert_eq!(interpolated_quantile(&values, 0.25), 2.5);
        assert_eq!(interpolated_quantile(&values, 0.50), 5.0);
        assert_eq!(interpolated_quantile(&values, 0.75), 7.5);
    }

    #[test]
    fn quantile_on_single_value_returns_it() {
        let values = [42.0];
        assert_eq!(interpolated_quantile(&values, 0.25), 42.0);
        assert_eq!(interpolated_quantile(&values, 0.50), 42.0);
        assert_eq!(interpolated_quantile(&values, 0.75), 42.0);
    }

    #[test]
    fn quantile_hits_exact_ranks_without_interpolating() {
        // n = 5: ranks 1, 2, 3 land exactly on sorted elements.
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(interpolated_quantile(&values, 0.25), 2.0);
        assert_eq!(interpolated_quantile(&values, 0.50), 3.0);
        assert_eq!(interpolated_quantile(&values, 0.75), 4.0);
    }

    #[test]
    fn ties_keep_their_duplicate_ranks() {
        let values = [5.0, 5.0, 5.0, 9.0];
        assert_eq!(interpolated_quantile(&values, 0.25), 5.0);
        assert_eq!(interpolated_quantile(&values, 0.50), 5.0);
        // rank 2.25 sits a quarter of the way from 5.0 to 9.0
        assert_eq!(interpolated_quantile(&values, 0.75), 6.0);
    }
}
