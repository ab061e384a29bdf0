//! Quartile-estimation tests over aggregated customer measures.

use rfv_core::{
    error::SegmentError,
    measures::CustomerMeasures,
    quartiles::estimate,
    types::Measure,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn customer(id: &str, recency_days: i64, frequency: u64, value: f64) -> CustomerMeasures {
    CustomerMeasures {
        customer_id: id.into(),
        recency_days,
        frequency,
        value,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Four customers with evenly spaced values: rank (n−1)·p falls between
/// sorted elements, so every boundary is an interpolation.
#[test]
fn boundaries_interpolate_between_bracketing_values() {
    let population = [
        customer("a", 0, 1, 10.0),
        customer("b", 10, 2, 20.0),
        customer("c", 20, 3, 30.0),
        customer("d", 30, 4, 40.0),
    ];
    let boundaries = estimate(&population).unwrap();

    let recency = boundaries.bands_for(Measure::Recency).unwrap();
    assert_eq!(recency.q25, 7.5, "rank 0.75 between 0 and 10");
    assert_eq!(recency.q50, 15.0);
    assert_eq!(recency.q75, 22.5);

    let value = boundaries.bands_for(Measure::Value).unwrap();
    assert_eq!(value.q25, 17.5);
    assert_eq!(value.q50, 25.0);
    assert_eq!(value.q75, 32.5);
}

/// Each measure's boundaries come from that measure's own values,
/// independently of the other two.
#[test]
fn measures_are_estimated_independently() {
    let population = [
        customer("a", 100, 1, 5.0),
        customer("b", 0, 9, 500.0),
    ];
    let boundaries = estimate(&population).unwrap();

    let recency = boundaries.bands_for(Measure::Recency).unwrap();
    let frequency = boundaries.bands_for(Measure::Frequency).unwrap();
    assert_eq!(recency.q50, 50.0);
    assert_eq!(frequency.q50, 5.0);
}

/// Invariant q25 ≤ q50 ≤ q75 holds for every measure.
#[test]
fn bands_are_ordered() {
    let population = [
        customer("a", 3, 7, 12.0),
        customer("b", 90, 1, 800.0),
        customer("c", 14, 4, 45.5),
        customer("d", 14, 4, 45.5),
        customer("e", 27, 2, 120.0),
    ];
    let boundaries = estimate(&population).unwrap();

    for measure in Measure::ALL {
        let bands = boundaries.bands_for(measure).unwrap();
        assert!(
            bands.q25 <= bands.q50 && bands.q50 <= bands.q75,
            "{}: bands out of order: {:?}",
            measure.name(),
            bands
        );
    }
}

/// Duplicate values keep their duplicate ranks: with three of four
/// customers tied, the lower boundaries sit on the tied value.
#[test]
fn ties_pull_boundaries_onto_the_tied_value() {
    let population = [
        customer("a", 5, 1, 50.0),
        customer("b", 5, 1, 50.0),
        customer("c", 5, 1, 50.0),
        customer("d", 9, 1, 90.0),
    ];
    let boundaries = estimate(&population).unwrap();

    let recency = boundaries.bands_for(Measure::Recency).unwrap();
    assert_eq!(recency.q25, 5.0);
    assert_eq!(recency.q50, 5.0);
    assert_eq!(recency.q75, 6.0, "rank 2.25: a quarter from 5 toward 9");
}

/// A single customer collapses all three boundaries onto their own
/// values for every measure.
#[test]
fn single_customer_collapses_all_bands() {
    let population = [customer("only", 12, 3, 99.0)];
    let boundaries = estimate(&population).unwrap();

    let recency = boundaries.bands_for(Measure::Recency).unwrap();
    assert_eq!((recency.q25, recency.q50, recency.q75), (12.0, 12.0, 12.0));

    let value = boundaries.bands_for(Measure::Value).unwrap();
    assert_eq!((value.q25, value.q50, value.q75), (99.0, 99.0, 99.0));
}

/// The estimator guards the empty population itself, independently of
/// the aggregation stage's `EmptyLog`.
#[test]
fn empty_population_is_rejected() {
    let err = estimate(&[]).unwrap_err();
    assert!(
        matches!(err, SegmentError::InsufficientPopulation),
        "expected InsufficientPopulation, got {err}"
    );
}
