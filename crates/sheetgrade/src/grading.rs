//! Grading engine: answer vector + answer key -> section scores and remediation.
//!
//! The answer vector is positional: section `N` always covers global
//! questions `(N-1)*10 .. N*10`, regardless of the order sections appear in
//! the key. Sections are reported in key order.
//!
//! Remediation tiers are cut at fixed wrong-answer counts (`<=2`, `3..=4`,
//! `>=5`). These cut points assume 10-question sections.

use crate::error::GradeError;
use crate::template::{ANSWER_COUNT, CHOICES, QUESTIONS_PER_SECTION, SECTIONS};

/// Remediation severity for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Light,
    Medium,
    Heavy,
}

impl Tier {
    pub const LIGHT_MAX_WRONG: usize = 2;
    pub const MEDIUM_MAX_WRONG: usize = 4;

    /// Tier for a section with `wrong` incorrect answers.
    pub fn from_wrong_count(wrong: usize) -> Self {
        if wrong <= Self::LIGHT_MAX_WRONG {
            Self::Light
        } else if wrong <= Self::MEDIUM_MAX_WRONG {
            Self::Medium
        } else {
            Self::Heavy
        }
    }
}

/// Remediation texts keyed by tier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemediationTexts {
    pub light: String,
    pub medium: String,
    pub heavy: String,
}

impl RemediationTexts {
    pub fn for_tier(&self, tier: Tier) -> &str {
        match tier {
            Tier::Light => &self.light,
            Tier::Medium => &self.medium,
            Tier::Heavy => &self.heavy,
        }
    }
}

/// One section of a test's answer key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerKeySection {
    /// 1-based section number.
    pub section_number: usize,
    /// Correct choices (`1..=5`), one per question.
    pub answers: Vec<u8>,
    pub remediation: RemediationTexts,
}

/// Score for one section.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SectionScore {
    pub section_number: usize,
    pub correct: usize,
    pub total: usize,
    /// 1-based global question numbers answered incorrectly, ascending.
    pub wrong_question_numbers: Vec<usize>,
}

impl SectionScore {
    pub fn wrong_count(&self) -> usize {
        self.total - self.correct
    }
}

/// Remediation task assigned for one section.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssignedTask {
    pub section_number: usize,
    pub tier: Tier,
    pub task_text: String,
}

/// Grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradedResult {
    pub sections: Vec<SectionScore>,
    pub tasks: Vec<AssignedTask>,
    /// `round(100 * correct / total)` over all graded sections, half-up.
    pub overall_score: u8,
}

/// Grade `answers` against `key`.
///
/// `answers` must hold exactly 30 values in `0..=5`; every key section must
/// be numbered `1..=3`, appear once, and list 10 answers in `1..=5`.
pub fn grade(answers: &[u8], key: &[AnswerKeySection]) -> Result<GradedResult, GradeError> {
    validate_request(answers, key)?;

    let mut sections = Vec::with_capacity(key.len());
    let mut tasks = Vec::with_capacity(key.len());
    let mut total_correct = 0usize;
    let mut total_questions = 0usize;

    for section in key {
        let start = (section.section_number - 1) * QUESTIONS_PER_SECTION;
        let submitted = &answers[start..start + QUESTIONS_PER_SECTION];

        let mut correct = 0usize;
        let mut wrong_question_numbers = Vec::new();
        for (offset, (&given, &expected)) in submitted.iter().zip(&section.answers).enumerate() {
            if given == expected {
                correct += 1;
            } else {
                wrong_question_numbers.push(start + offset + 1);
            }
        }

        let score = SectionScore {
            section_number: section.section_number,
            correct,
            total: section.answers.len(),
            wrong_question_numbers,
        };
        let tier = Tier::from_wrong_count(score.wrong_count());
        tracing::debug!(
            "section {}: {}/{} correct, tier {:?}",
            score.section_number,
            score.correct,
            score.total,
            tier
        );

        total_correct += score.correct;
        total_questions += score.total;
        tasks.push(AssignedTask {
            section_number: section.section_number,
            tier,
            task_text: section.remediation.for_tier(tier).to_string(),
        });
        sections.push(score);
    }

    let overall_score = (100.0 * total_correct as f64 / total_questions as f64).round() as u8;

    Ok(GradedResult {
        sections,
        tasks,
        overall_score,
    })
}

fn validate_request(answers: &[u8], key: &[AnswerKeySection]) -> Result<(), GradeError> {
    if answers.len() != ANSWER_COUNT {
        return Err(GradeError::AnswerCount {
            expected: ANSWER_COUNT,
            actual: answers.len(),
        });
    }
    if let Some((i, &value)) = answers
        .iter()
        .enumerate()
        .find(|&(_, &v)| v as usize > CHOICES)
    {
        return Err(GradeError::InvalidAnswer {
            question: i + 1,
            value,
        });
    }
    if key.is_empty() {
        return Err(GradeError::EmptyKey);
    }

    let mut seen = [false; SECTIONS];
    for section in key {
        let n = section.section_number;
        if !(1..=SECTIONS).contains(&n) {
            return Err(GradeError::SectionOutOfRange {
                section: n,
                max: SECTIONS,
            });
        }
        if std::mem::replace(&mut seen[n - 1], true) {
            return Err(GradeError::DuplicateSection { section: n });
        }
        if section.answers.len() != QUESTIONS_PER_SECTION {
            return Err(GradeError::SectionLength {
                section: n,
                expected: QUESTIONS_PER_SECTION,
                actual: section.answers.len(),
            });
        }
        if let Some((position, &value)) = section
            .answers
            .iter()
            .enumerate()
            .find(|&(_, &v)| v == 0 || v as usize > CHOICES)
        {
            return Err(GradeError::InvalidKeyAnswer {
                section: n,
                position: position + 1,
                value,
            });
        }
    }

    Ok(())
}
