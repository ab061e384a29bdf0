//! Per-customer measure aggregation — the first pipeline stage.
//!
//! Reduces the raw transaction log to one row per distinct customer:
//!   recency   — whole days between the customer's latest purchase and
//!               the reference date (lower is better)
//!   frequency — number of purchases in the log (higher is better)
//!   value     — total amount spent (higher is better)
//!
//! Pure function of (log, reference date); no I/O, no shared state.

use crate::{
    error::{SegmentError, SegmentResult},
    types::{CustomerId, Measure, Transaction},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derived measures for a single customer.
///
/// Exactly one row per customer id appearing in the log, and no row for
/// anyone else — a customer without transactions does not exist here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMeasures {
    pub customer_id:  CustomerId,
    pub recency_days: i64,
    pub frequency:    u64,
    pub value:        f64,
}

impl CustomerMeasures {
    /// Raw value of one measure, as the quartile and grading stages see it.
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Recency   => self.recency_days as f64,
            Measure::Frequency => self.frequency as f64,
            Measure::Value     => self.value,
        }
    }
}

/// Reduce the transaction log to per-customer measures against an
/// explicit reference date.
///
/// The reference date is the "as of" day recency is measured from. It
/// must not precede any customer's latest purchase — recency is defined
/// as non-negative whole days. Callers normally pass the log's own
/// maximum purchase date.
///
/// Output is sorted by customer id.
pub fn aggregate(
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> SegmentResult<Vec<CustomerMeasures>> {
    if transactions.is_empty() {
        return Err(SegmentError::EmptyLog);
    }

    // Group by customer: (latest purchase, purchase count, amount sum).
    let mut grouped: HashMap<&str, (NaiveDate, u64, f64)> = HashMap::new();
    for txn in transactions {
        let entry = grouped
            .entry(txn.customer_id.as_str())
            .or_insert((txn.purchase_date, 0, 0.0));
        if txn.purchase_date > entry.0 {
            entry.0 = txn.purchase_date;
        }
        entry.1 += 1;
        entry.2 += txn.amount;
    }

    // Sorted customer order: deterministic output, and a deterministic
    // offender when the reference date is inconsistent with the log.
    let mut customer_ids: Vec<&str> = grouped.keys().copied().collect();
    customer_ids.sort_unstable();

    let mut measures = Vec::with_capacity(customer_ids.len());
    for customer_id in customer_ids {
        let (last_purchase, frequency, value) = grouped[customer_id];
        let recency_days = reference_date
            .signed_duration_since(last_purchase)
            .num_days();
        if recency_days < 0 {
            return Err(SegmentError::InvalidReferenceDate {
                customer_id: customer_id.to_string(),
                last_purchase,
                reference_date,
            });
        }
        measures.push(CustomerMeasures {
            customer_id: customer_id.to_string(),
            recency_days,
            frequency,
            value,
        });
    }

    log::info!(
        "aggregate: {} customers from {} transactions (as of {reference_date})",
        measures.len(),
        transactions.len()
    );

    Ok(measures)
}
