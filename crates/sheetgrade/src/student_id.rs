//! Structured student ID: one prefix letter plus five digits, read from bubbles.
//!
//! Decoding runs in two stages:
//!
//! 1. **Prefix** – two competing bubbles. No winner means no ID at all; the
//!    digits are meaningless without the prefix.
//! 2. **Digits** – ten competing bubbles per position. A position with no
//!    winner falls back to `'0'` and contributes only its measured fill ratio
//!    to the confidence.

use crate::sampler::FillSampler;
use crate::select::{select_max_fill, Selection};
use crate::template::{PixelGeometry, ID_DIGITS};

/// Length of a well-formed ID (`"h12345"`).
pub const STUDENT_ID_LEN: usize = 1 + ID_DIGITS;

const PLACEHOLDER_DIGIT: char = '0';

/// Structured-ID decode outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentIdReading {
    /// Prefix letter plus five digits, or `None` when the prefix was rejected.
    pub value: Option<String>,
    /// Mean of the prefix fill and the five digit fills; 0 when rejected.
    pub confidence: f32,
    pub prefix: Selection,
    /// Per-position digit selections (empty when the prefix was rejected).
    pub digits: Vec<Selection>,
}

/// Read the structured ID from its bubble grid.
pub fn read_student_id(
    sampler: FillSampler<'_>,
    geometry: &PixelGeometry,
    prefixes: [char; 2],
    accept_threshold: f32,
) -> StudentIdReading {
    let prefix_fills = sampler.sample_all(&geometry.id_prefix);
    let prefix = select_max_fill(&prefix_fills, accept_threshold);
    let Selection::Accepted {
        index: prefix_idx,
        fill: prefix_fill,
    } = prefix
    else {
        tracing::debug!(
            "student ID prefix rejected (fills {:.3} / {:.3})",
            prefix_fills[0],
            prefix_fills[1]
        );
        return StudentIdReading {
            value: None,
            confidence: 0.0,
            prefix,
            digits: Vec::new(),
        };
    };

    let mut id = String::with_capacity(STUDENT_ID_LEN);
    id.push(prefixes[prefix_idx]);
    let mut fill_sum = prefix_fill;
    let mut digits = Vec::with_capacity(ID_DIGITS);

    for (position, column) in geometry.id_digits.iter().enumerate() {
        let fills = sampler.sample_all(column);
        let selection = select_max_fill(&fills, accept_threshold);
        let digit = selection
            .accepted()
            .and_then(|d| char::from_digit(d as u32, 10))
            .unwrap_or(PLACEHOLDER_DIGIT);
        tracing::trace!("ID digit {} -> {} ({:?})", position, digit, selection);
        id.push(digit);
        fill_sum += selection.best_fill();
        digits.push(selection);
    }

    if id.chars().count() != STUDENT_ID_LEN {
        return StudentIdReading {
            value: None,
            confidence: 0.0,
            prefix,
            digits,
        };
    }

    StudentIdReading {
        value: Some(id),
        confidence: fill_sum / STUDENT_ID_LEN as f32,
        prefix,
        digits,
    }
}
