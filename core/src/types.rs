//! Shared primitive types used across the entire pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stable, opaque identifier for a customer.
pub type CustomerId = String;

/// A unique identifier for a single purchase event.
pub type PurchaseId = String;

/// One row of the raw transaction log: a single purchase event.
///
/// The log is the source of truth and is never mutated. Zero or negative
/// amounts pass through untouched — input validation belongs to whatever
/// produced the log, not to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub customer_id:   CustomerId,
    pub purchase_date: NaiveDate,
    pub purchase_id:   PurchaseId,
    pub amount:        f64,
}

/// The three segmentation measures.
///
/// Selects which grading rule applies (recency inverts the comparison)
/// and keys the quartile boundary map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Recency,
    Frequency,
    Value,
}

impl Measure {
    /// All measures, in score order: recency, frequency, value.
    pub const ALL: [Measure; 3] = [Measure::Recency, Measure::Frequency, Measure::Value];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Recency   => "recency",
            Self::Frequency => "frequency",
            Self::Value     => "value",
        }
    }
}
