//! RFV customer segmentation: Recency, Frequency, Value.
//!
//! Reduces a raw purchase log to one letter-graded row per customer:
//! quartile boundaries are estimated per measure over the population,
//! each measure is graded A–D against them (recency inverted — lower is
//! better), and the 3-character score selects a marketing action.
//!
//! The whole pipeline is a pure function of (transaction log, reference
//! date, action table). File I/O, parsing, and export live in the runner
//! crate, never here.

pub mod config;
pub mod error;
pub mod grading;
pub mod measures;
pub mod pipeline;
pub mod quartiles;
pub mod score;
pub mod types;
