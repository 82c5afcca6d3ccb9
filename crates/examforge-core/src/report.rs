//! Score aggregation and the markdown-ish text shown to the user.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::model::{EvaluationResults, Questions};

/// Totals for one graded exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Sum of the marks of every question.
    pub total_possible: u32,
    /// Sum of marks awarded, before the time deduction.
    pub total_obtained: u32,
    /// Time-overrun penalty, applied once to the total.
    pub deduction: u32,
    /// `total_obtained - deduction`, floored at zero.
    pub final_score: u32,
}

impl ScoreSummary {
    pub fn compute(questions: &Questions, results: &EvaluationResults) -> Self {
        let total_obtained = results.total_obtained();
        Self {
            total_possible: questions.total_marks(),
            total_obtained,
            deduction: results.deduction,
            final_score: total_obtained.saturating_sub(results.deduction),
        }
    }
}

/// Render the generated question list.
pub fn render_questions(subject: &str, topic: &str, questions: &Questions, total_time: u32) -> String {
    let mut out = format!("**Generated Questions for {subject} - {topic}:**\n\n");
    for (i, q) in questions.questions.iter().enumerate() {
        let _ = write!(out, "Q{}. {} ({} marks)\n\n", i + 1, q.question_text, q.marks);
    }
    let _ = writeln!(out, "**Total Time:** {total_time} minutes");
    out
}

/// Render the evaluation report.
///
/// Evaluations are paired with questions by position; callers are expected
/// to have checked that both lists have the same length.
pub fn render_evaluation(
    questions: &Questions,
    results: &EvaluationResults,
    total_time: u32,
    elapsed_minutes: f64,
) -> String {
    let summary = ScoreSummary::compute(questions, results);
    let mut out = String::from("**Evaluation Results:**\n\n");

    for (i, (eval, question)) in results
        .evaluations
        .iter()
        .zip(&questions.questions)
        .enumerate()
    {
        let _ = write!(
            out,
            "**Question {}:** Marks Obtained: {}/{}, Feedback: {}\n\n",
            i + 1,
            eval.marks_obtained,
            question.marks,
            eval.feedback
        );
    }

    out.push_str("**Time Summary:**\n");
    let _ = writeln!(out, "- Allocated Time: {total_time} minutes");
    let _ = writeln!(out, "- Time Taken: {elapsed_minutes:.2} minutes");
    if elapsed_minutes > f64::from(total_time) {
        let _ = writeln!(
            out,
            "- Excess Time: {:.2} minutes",
            elapsed_minutes - f64::from(total_time)
        );
        let _ = writeln!(out, "- Time Deduction: {} marks", summary.deduction);
    } else {
        out.push_str("- No time deduction applied.\n");
    }

    out.push_str("\n**Marks Summary:**\n");
    let _ = writeln!(
        out,
        "- Marks Before Deduction: {}/{}",
        summary.total_obtained, summary.total_possible
    );
    if summary.deduction > 0 {
        let _ = writeln!(
            out,
            "- Marks After Time Deduction: {}/{}",
            summary.final_score, summary.total_possible
        );
    }
    let _ = writeln!(
        out,
        "- **Final Score**: {}/{}",
        summary.final_score, summary.total_possible
    );

    out
}
