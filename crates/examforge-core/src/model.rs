//! Core data model types for examforge.
//!
//! `Questions` and `EvaluationResults` double as the structured-output
//! contracts sent to the model: their JSON schema is derived with `schemars`
//! and replies are deserialized straight into them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters an instructor fills in to request an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamParams {
    pub subject: String,
    pub topic: String,
    /// How many questions to ask for.
    pub num_questions: u32,
    pub marks_per_question: u32,
    /// Total exam duration in minutes.
    pub total_time: u32,
    /// Free-text instructions for the question writer. May be empty.
    #[serde(default)]
    pub comment: String,
}

/// A single exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    /// The full text of the question as shown to the student.
    pub question_text: String,
    /// Maximum marks this question is worth.
    pub marks: u32,
}

/// An ordered list of questions. Order is presentation and grading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Questions {
    /// The generated questions, in the order they should be answered.
    pub questions: Vec<Question>,
}

impl Questions {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Sum of the marks of every question, saturating at `u32::MAX`.
    pub fn total_marks(&self) -> u32 {
        self.questions
            .iter()
            .fold(0, |acc: u32, q| acc.saturating_add(q.marks))
    }

    /// Like [`Self::total_marks`], but `None` if the sum does not fit.
    pub fn checked_total_marks(&self) -> Option<u32> {
        self.questions
            .iter()
            .try_fold(0u32, |acc, q| acc.checked_add(q.marks))
    }
}

/// The grade for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationResult {
    /// Marks awarded for the answer, ignoring time taken.
    pub marks_obtained: u32,
    /// Feedback on the answer, or hints when the question was left unanswered.
    pub feedback: String,
}

/// Grades for every question plus a single time-overrun penalty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationResults {
    /// One evaluation per question, in question order.
    pub evaluations: Vec<EvaluationResult>,
    /// Marks deducted once from the total for exceeding the allocated time.
    pub deduction: u32,
}

impl EvaluationResults {
    /// Sum of the marks awarded across all answers, before any deduction.
    /// Saturates at `u32::MAX`.
    pub fn total_obtained(&self) -> u32 {
        self.evaluations
            .iter()
            .fold(0, |acc: u32, e| acc.saturating_add(e.marks_obtained))
    }

    /// Like [`Self::total_obtained`], but `None` if the sum does not fit.
    pub fn checked_total_obtained(&self) -> Option<u32> {
        self.evaluations
            .iter()
            .try_fold(0u32, |acc, e| acc.checked_add(e.marks_obtained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals() {
        let questions = Questions {
            questions: vec![
                Question {
                    question_text: "a".into(),
                    marks: 10,
                },
                Question {
                    question_text: "b".into(),
                    marks: 5,
                },
            ],
        };
        assert_eq!(questions.total_marks(), 15);
        assert_eq!(questions.len(), 2);

        let results = EvaluationResults {
            evaluations: vec![
                EvaluationResult {
                    marks_obtained: 7,
                    feedback: "ok".into(),
                },
                EvaluationResult {
                    marks_obtained: 0,
                    feedback: "unanswered".into(),
                },
            ],
            deduction: 2,
        };
        assert_eq!(results.total_obtained(), 7);
    }

    #[test]
    fn totals_do_not_overflow() {
        let questions = Questions {
            questions: vec![
                Question {
                    question_text: "a".into(),
                    marks: u32::MAX,
                },
                Question {
                    question_text: "b".into(),
                    marks: 2,
                },
            ],
        };
        assert_eq!(questions.total_marks(), u32::MAX);
        assert_eq!(questions.checked_total_marks(), None);

        let results = EvaluationResults {
            evaluations: vec![
                EvaluationResult {
                    marks_obtained: u32::MAX,
                    feedback: "a".into(),
                },
                EvaluationResult {
                    marks_obtained: 1,
                    feedback: "b".into(),
                },
            ],
            deduction: 0,
        };
        assert_eq!(results.total_obtained(), u32::MAX);
        assert_eq!(results.checked_total_obtained(), None);
    }

    #[test]
    fn exam_params_comment_defaults_to_empty() {
        let params: ExamParams = serde_json::from_str(
            r#"{"subject":"Math","topic":"Algebra","num_questions":3,"marks_per_question":10,"total_time":30}"#,
        )
        .unwrap();
        assert_eq!(params.comment, "");
        assert_eq!(params.num_questions, 3);
    }

    #[test]
    fn negative_marks_are_rejected_by_the_type() {
        let err = serde_json::from_str::<Questions>(
            r#"{"questions":[{"question_text":"x","marks":-1}]}"#,
        );
        assert!(err.is_err());
    }
}
