//! Error types for scanning, grading, template and config loading.
//!
//! Only hard failures live here. A sheet that decodes badly is not an error:
//! missing fields show up in [`crate::RecognitionResult::errors`].

use thiserror::Error;

/// Fatal input errors raised before any recognition result exists.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Contract violations in a grading request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradeError {
    #[error("answer vector must have {expected} entries, got {actual}")]
    AnswerCount { expected: usize, actual: usize },

    #[error("answer {value} at question {question} is outside 0..=5")]
    InvalidAnswer { question: usize, value: u8 },

    #[error("answer key has no sections")]
    EmptyKey,

    #[error("section {section} is outside 1..={max}")]
    SectionOutOfRange { section: usize, max: usize },

    #[error("section {section} appears more than once in the answer key")]
    DuplicateSection { section: usize },

    #[error("section {section} must have {expected} answers, got {actual}")]
    SectionLength {
        section: usize,
        expected: usize,
        actual: usize,
    },

    #[error("key answer {value} at position {position} of section {section} is outside 1..=5")]
    InvalidKeyAnswer {
        section: usize,
        position: usize,
        value: u8,
    },
}

/// Template JSON loading and validation errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported template schema '{found}' (expected '{expected}')")]
    UnsupportedSchema {
        found: String,
        expected: &'static str,
    },

    #[error("invalid template: {0}")]
    Invalid(String),
}

/// Scan configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scan config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
