//! The segmentation pipeline — the heart of the engine.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!   1. aggregate — transaction log → per-customer measures
//!   2. estimate  — measures → per-measure quartile boundaries
//!   3. compose   — measures + boundaries + action table → segmented rows
//!
//! RULES:
//!   - Each stage fully consumes its predecessor's output. No streaming,
//!     no partial results.
//!   - A run either returns the complete segmented table or fails with
//!     the first stage error. Partial output is never surfaced.
//!   - Stages share no mutable state. A grade depends only on that
//!     customer's own measures and the run-global boundaries, never on
//!     another customer's grades.

use crate::{
    config::ActionTable,
    error::SegmentResult,
    measures::aggregate,
    quartiles::{estimate, QuartileBoundaries},
    score::{compose, SegmentedCustomer},
    types::Transaction,
};
use chrono::NaiveDate;

/// Run the full segmentation pipeline over a transaction log.
///
/// `reference_date` is the "as of" day recency is measured against; it
/// must not precede any purchase in the log (typically it is the log's
/// own maximum purchase date, but that choice belongs to the caller).
/// Rows come back sorted by customer id.
pub fn segment(
    transactions: &[Transaction],
    reference_date: NaiveDate,
    actions: &ActionTable,
) -> SegmentResult<Vec<SegmentedCustomer>> {
    let (segmented, _) = segment_with_boundaries(transactions, reference_date, actions)?;
    Ok(segmented)
}

/// Like `segment`, but also returns the run's quartile boundaries for
/// callers that report on them (summaries, exports).
pub fn segment_with_boundaries(
    transactions: &[Transaction],
    reference_date: NaiveDate,
    actions: &ActionTable,
) -> SegmentResult<(Vec<SegmentedCustomer>, QuartileBoundaries)> {
    let measures = aggregate(transactions, reference_date)?;
    let boundaries = estimate(&measures)?;
    let segmented = compose(&measures, &boundaries, actions)?;
    Ok((segmented, boundaries))
}
