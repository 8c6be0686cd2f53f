//! Multiple-choice answer vector: 3 sections x 10 questions x 5 choices.
//!
//! Always yields exactly [`ANSWER_COUNT`] values. A question without a strict
//! winner above threshold reads as `0` with confidence `0`. A double mark with
//! equal fill ratios has no strict winner, so it also reads as unanswered.

use crate::sampler::FillSampler;
use crate::select::{select_max_fill, Selection};
use crate::template::{PixelGeometry, ANSWER_COUNT};

/// Value recorded for an unanswered or unreadable question.
pub const UNANSWERED: u8 = 0;

/// Answer decode outcome, indexed by 0-based global question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReading {
    /// Choice values in `1..=5`, or [`UNANSWERED`].
    pub answers: Vec<u8>,
    /// Winning fill ratio for accepted questions, `0.0` otherwise.
    pub confidences: Vec<f32>,
    pub selections: Vec<Selection>,
}

impl AnswerReading {
    /// Number of questions that read as [`UNANSWERED`].
    pub fn unmarked_count(&self) -> usize {
        self.answers.iter().filter(|&&a| a == UNANSWERED).count()
    }
}

/// Read every answer row of the sheet.
pub fn read_answers(
    sampler: FillSampler<'_>,
    geometry: &PixelGeometry,
    accept_threshold: f32,
) -> AnswerReading {
    let mut answers = Vec::with_capacity(ANSWER_COUNT);
    let mut confidences = Vec::with_capacity(ANSWER_COUNT);
    let mut selections = Vec::with_capacity(ANSWER_COUNT);

    for (question, row) in geometry.answers.iter().enumerate() {
        let fills = sampler.sample_all(row);
        let selection = select_max_fill(&fills, accept_threshold);
        let (value, confidence) = match selection {
            Selection::Accepted { index, fill } => ((index + 1) as u8, fill),
            Selection::Rejected { .. } => (UNANSWERED, 0.0),
        };
        tracing::trace!("question {} -> {} (fills {:?})", question + 1, value, fills);
        answers.push(value);
        confidences.push(confidence);
        selections.push(selection);
    }

    AnswerReading {
        answers,
        confidences,
        selections,
    }
}
