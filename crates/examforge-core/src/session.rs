//! One generate → evaluate lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ExamParams, Questions};
use crate::timing::elapsed_minutes;

/// The state carried from question generation to answer evaluation.
///
/// Created by [`crate::ExamEngine::generate_questions`] and handed back by
/// reference to [`crate::ExamEngine::evaluate_answers`]. Nothing outlives the
/// process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: Uuid,
    /// The parameters the exam was generated from.
    pub params: ExamParams,
    pub questions: Questions,
    /// When the questions were handed to the student.
    pub started_at: DateTime<Utc>,
}

impl ExamSession {
    pub fn new(params: ExamParams, questions: Questions, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            params,
            questions,
            started_at,
        }
    }

    /// Minutes since the exam started, as of `now`.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        elapsed_minutes(self.started_at, now)
    }
}
