//! Quartile grading rules — the third pipeline stage.
//!
//! Two rules, selected by measure identity:
//!   recency         — lower is better: <= q25 earns an 'A'
//!   frequency/value — higher is better: <= q25 earns a 'D'
//!
//! Every comparison is non-strict, so a value sitting exactly on a
//! boundary lands in the same bucket for every customer. With a single
//! customer all three bands equal the value itself and the first branch
//! wins: recency grades 'A', frequency and value grade 'D'. That is the
//! method's own consequence, not a special case.

use crate::{
    error::SegmentResult,
    quartiles::{QuartileBands, QuartileBoundaries},
    types::Measure,
};
use serde::{Deserialize, Serialize};

/// A quartile letter grade.
///
/// Ordering puts better grades first (A < B < C < D); the monotonicity
/// properties of the grading rules are stated in those terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_char(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

/// Grade one raw measure value against the run's boundaries.
///
/// Pure function of (value, measure, boundaries): a customer's grade
/// never depends on other customers beyond what the boundaries already
/// encode, so per-row evaluation order is irrelevant.
pub fn grade_measure(
    value: f64,
    measure: Measure,
    boundaries: &QuartileBoundaries,
) -> SegmentResult<Grade> {
    let bands = boundaries.bands_for(measure)?;
    let grade = match measure {
        Measure::Recency => recency_grade(value, bands),
        Measure::Frequency | Measure::Value => frequency_value_grade(value, bands),
    };
    Ok(grade)
}

/// Lower is better: the most recent quartile earns an 'A'.
fn recency_grade(value: f64, bands: &QuartileBands) -> Grade {
    if value <= bands.q25 {
        Grade::A
    } else if value <= bands.q50 {
        Grade::B
    } else if value <= bands.q75 {
        Grade::C
    } else {
        Grade::D
    }
}

/// Higher is better: the top quartile earns an 'A'.
fn frequency_value_grade(value: f64, bands: &QuartileBands) -> Grade {
    if value <= bands.q25 {
        Grade::D
    } else if value <= bands.q50 {
        Grade::C
    } else if value <= bands.q75 {
        Grade::B
    } else {
        Grade::A
    }
}
