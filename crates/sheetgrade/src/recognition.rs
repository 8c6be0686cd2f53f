//! Recognition aggregation: merges the three decoder stages into one result.

use crate::answers::{AnswerReading, UNANSWERED};
use crate::identifier::{IdentifierReading, IdentifierRejectReason};
use crate::select::{RejectReason, Selection};
use crate::student_id::StudentIdReading;

pub const IDENTIFIER_NOT_RECOGNIZED: &str = "identifier not recognized";
pub const STUDENT_ID_NOT_RECOGNIZED: &str = "structured ID not recognized";

/// Per-field confidences in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldConfidence {
    pub identifier: f32,
    pub student_id: f32,
    /// One value per question, 0-based global order.
    pub answers: Vec<f32>,
}

/// Which bubble field a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BubbleField {
    StudentIdPrefix,
    StudentIdDigit { position: usize },
    /// 1-based global question number.
    Answer { question: usize },
}

/// A rejected bubble field and the best fill ratio it showed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldReject {
    pub field: BubbleField,
    pub reason: RejectReason,
    pub best_fill: f32,
}

/// Why individual fields were not accepted.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecognitionDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<IdentifierRejectReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_fields: Vec<FieldReject>,
}

impl RecognitionDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none() && self.rejected_fields.is_empty()
    }
}

/// Full recognition outcome for one sheet.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecognitionResult {
    /// Test identifier from the 2D code.
    pub identifier: Option<String>,
    /// Structured student ID such as `"h12345"`.
    pub student_id: Option<String>,
    /// Exactly 30 values in `0..=5`; `0` means unanswered or unreadable.
    pub answers: Vec<u8>,
    /// Unweighted mean of identifier, student-ID and mean answer confidence.
    pub confidence: f32,
    /// Human-readable problems, in fixed order.
    pub errors: Vec<String>,
    pub field_confidence: FieldConfidence,
    #[serde(default, skip_serializing_if = "RecognitionDiagnostics::is_empty")]
    pub diagnostics: RecognitionDiagnostics,
}

impl RecognitionResult {
    /// `true` when no field was reported as missing.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn unmarked_count(&self) -> usize {
        self.answers.iter().filter(|&&a| a == UNANSWERED).count()
    }
}

/// Combine the stage outputs.
pub fn aggregate(
    identifier: IdentifierReading,
    student_id: StudentIdReading,
    answers: AnswerReading,
) -> RecognitionResult {
    let mut errors = Vec::new();
    if identifier.value.is_none() {
        errors.push(IDENTIFIER_NOT_RECOGNIZED.to_string());
    }
    if student_id.value.is_none() {
        errors.push(STUDENT_ID_NOT_RECOGNIZED.to_string());
    }
    let unmarked = answers.unmarked_count();
    if unmarked > 0 {
        errors.push(format!("{unmarked} questions not marked"));
    }

    let answer_confidence = mean(&answers.confidences);
    let confidence = (identifier.confidence + student_id.confidence + answer_confidence) / 3.0;

    let diagnostics = RecognitionDiagnostics {
        identifier: identifier.reject_reason,
        rejected_fields: collect_rejects(&student_id, &answers),
    };

    RecognitionResult {
        identifier: identifier.value,
        student_id: student_id.value,
        answers: answers.answers,
        confidence,
        errors,
        field_confidence: FieldConfidence {
            identifier: identifier.confidence,
            student_id: student_id.confidence,
            answers: answers.confidences,
        },
        diagnostics,
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

fn collect_rejects(student_id: &StudentIdReading, answers: &AnswerReading) -> Vec<FieldReject> {
    let prefix = std::iter::once((BubbleField::StudentIdPrefix, &student_id.prefix));
    let digits = student_id
        .digits
        .iter()
        .enumerate()
        .map(|(position, s)| (BubbleField::StudentIdDigit { position }, s));
    let questions = answers
        .selections
        .iter()
        .enumerate()
        .map(|(q, s)| (BubbleField::Answer { question: q + 1 }, s));

    prefix
        .chain(digits)
        .chain(questions)
        .filter_map(|(field, selection)| match *selection {
            Selection::Accepted { .. } => None,
            Selection::Rejected { reason, best_fill } => Some(FieldReject {
                field,
                reason,
                best_fill,
            }),
        })
        .collect()
}
