use crate::types::CustomerId;
use chrono::NaiveDate;
use thiserror::Error;

/// Everything that can abort a segmentation run.
///
/// All variants are terminal: nothing is retried and no partial output is
/// surfaced. Each carries enough context (customer id, dates, measure
/// name) to diagnose the offending input.
#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("empty transaction log: no customers to segment")]
    EmptyLog,

    #[error(
        "reference date {reference_date} precedes the last purchase \
         ({last_purchase}) of customer '{customer_id}'"
    )]
    InvalidReferenceDate {
        customer_id:    CustomerId,
        last_purchase:  NaiveDate,
        reference_date: NaiveDate,
    },

    #[error("no customers to derive quartile boundaries from")]
    InsufficientPopulation,

    #[error("no quartile boundaries for measure '{measure}'")]
    UnknownMeasure { measure: String },
}

pub type SegmentResult<T> = Result<T, SegmentError>;
