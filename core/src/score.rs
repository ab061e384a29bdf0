//! Score composition — the final pipeline stage.
//!
//! Concatenates the three letter grades (recency, frequency, value —
//! fixed order) into a 3-character score and looks up the recommended
//! marketing action. An unmapped score is an expected outcome, not an
//! error: the reference table names only a handful of the 64 possible
//! combinations, so a miss yields the table's sentinel action.

use crate::{
    config::ActionTable,
    error::SegmentResult,
    grading::{grade_measure, Grade},
    measures::CustomerMeasures,
    quartiles::QuartileBoundaries,
    types::{CustomerId, Measure},
};
use serde::{Deserialize, Serialize};

/// Terminal output row: one per customer, immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedCustomer {
    pub customer_id:     CustomerId,
    pub recency_days:    i64,
    pub frequency:       u64,
    pub value:           f64,
    pub grade_recency:   Grade,
    pub grade_frequency: Grade,
    pub grade_value:     Grade,
    pub score:           String,
    pub action:          String,
}

/// Concatenate three grades into the canonical 3-character score.
pub fn compose_score(recency: Grade, frequency: Grade, value: Grade) -> String {
    let mut score = String::with_capacity(3);
    score.push(recency.as_char());
    score.push(frequency.as_char());
    score.push(value.as_char());
    score
}

/// Grade every customer and attach score + recommended action.
///
/// Preserves the order of `measures`, so the segmented table inherits the
/// aggregation stage's customer-id ordering.
pub fn compose(
    measures: &[CustomerMeasures],
    boundaries: &QuartileBoundaries,
    actions: &ActionTable,
) -> SegmentResult<Vec<SegmentedCustomer>> {
    let mut segmented = Vec::with_capacity(measures.len());

    for m in measures {
        let grade_recency =
            grade_measure(m.measure(Measure::Recency), Measure::Recency, boundaries)?;
        let grade_frequency =
            grade_measure(m.measure(Measure::Frequency), Measure::Frequency, boundaries)?;
        let grade_value =
            grade_measure(m.measure(Measure::Value), Measure::Value, boundaries)?;

        let score = compose_score(grade_recency, grade_frequency, grade_value);
        let action = actions.action_for(&score).to_string();

        segmented.push(SegmentedCustomer {
            customer_id: m.customer_id.clone(),
            recency_days: m.recency_days,
            frequency: m.frequency,
            value: m.value,
            grade_recency,
            grade_frequency,
            grade_value,
            score,
            action,
        });
    }

    log::info!("compose: scored {} customers", segmented.len());

    Ok(segmented)
}
