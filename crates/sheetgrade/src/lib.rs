//! sheetgrade: optical answer-sheet recognition and grading.
//!
//! Reads photographed fixed-layout bubble sheets (3 sections x 10 questions x
//! 5 choices) and grades the decoded answers against an answer key.
//! The pipeline stages are:
//!
//! 1. **Normalize** – grayscale conversion and stretch onto the canonical raster.
//! 2. **Identifier** – test identifier from the 2D code in the top-left corner.
//! 3. **Student ID** – one prefix letter plus five digits from a bubble grid.
//! 4. **Answers** – 30 multiple-choice answers from the answer bubble grid.
//! 5. **Aggregate** – overall confidence and a human-readable error list.
//!
//! Grading is a separate pure step ([`grade`]) so that a human-corrected
//! answer vector can be graded the same way as a decoded one.
//!
//! Geometry is fixed by [`SheetTemplate`]; no perspective or skew correction
//! is performed, and the corner fiducials printed on the sheet are not used
//! for alignment.

mod answers;
mod api;
mod config;
mod error;
mod grading;
mod identifier;
mod pipeline;
mod raster;
mod recognition;
mod sampler;
mod select;
mod student_id;
mod template;
#[cfg(test)]
mod test_utils;

pub use answers::{read_answers, AnswerReading, UNANSWERED};
pub use api::Scanner;
pub use config::{ResampleFilter, ScanConfig};
pub use error::{ConfigError, GradeError, ScanError, TemplateError};
pub use grading::{
    grade, AnswerKeySection, AssignedTask, GradedResult, RemediationTexts, SectionScore, Tier,
};
pub use identifier::{parse_payload, read_identifier, IdentifierReading, IdentifierRejectReason};
pub use raster::CanonicalRaster;
pub use recognition::{
    aggregate, BubbleField, FieldConfidence, FieldReject, RecognitionDiagnostics,
    RecognitionResult, IDENTIFIER_NOT_RECOGNIZED, STUDENT_ID_NOT_RECOGNIZED,
};
pub use sampler::{fill_ratio, FillSampler};
pub use select::{select_max_fill, RejectReason, Selection};
pub use student_id::{read_student_id, StudentIdReading, STUDENT_ID_LEN};
pub use template::{
    mm_to_px, BubbleCenter, PixelGeometry, PixelSquare, SheetTemplate, ANSWER_COUNT, CHOICES,
    ID_DIGITS, MM_TO_PX, QUESTIONS_PER_SECTION, SECTIONS,
};
