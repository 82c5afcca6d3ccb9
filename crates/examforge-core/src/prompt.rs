//! Prompt construction.
//!
//! Values are substituted verbatim: nothing is escaped and no range checks
//! happen here. Bounds on user input belong to the form or CLI in front.

use crate::model::{ExamParams, Questions};

/// Build the instruction that asks the model for a set of exam questions.
pub fn generation_prompt(params: &ExamParams) -> String {
    format!(
        "You are an expert educational content creator tasked with generating high-quality exam questions.\n\
         Create {num} unique exam questions for the subject '{subject}' on the topic '{topic}'.\n\
         Each question should be worth {marks} marks and designed to fit within a total exam duration of {time} minutes.\n\
         Consider the following comment(if any) for context or specific instructions: '{comment}'.\n\
         Ensure the questions are clear, concise, and appropriate for the subject and topic, with no duplicates.\n",
        num = params.num_questions,
        subject = params.subject,
        topic = params.topic,
        marks = params.marks_per_question,
        time = params.total_time,
        comment = params.comment,
    )
}

/// One line per question: `"{n}. {text} (Marks: {marks})"`, numbered from 1.
pub fn format_question_list(questions: &Questions) -> String {
    questions
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {} (Marks: {})", i + 1, q.question_text, q.marks))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the instruction that asks the model to grade an answer sheet.
pub fn evaluation_prompt(
    answers: &str,
    questions: &Questions,
    total_time: u32,
    elapsed_minutes: f64,
) -> String {
    format!(
        "You are an expert examiner tasked with evaluating student answers and determining a time-based deduction.\n\
         The student has provided answers in a single text block, where each answer is prefixed with the question number (e.g., '1. [answer]', '2. [answer]').\n\
         Match each answer to its corresponding question based on the question number.\n\
         The questions and their maximum marks are provided below. Evaluate each answer for correctness, clarity, and completeness.\n\
         Assign marks_obtained for each question based on its quality, without considering time.\n\
         Separately, calculate a time-based deduction to be applied to the total marks:\n\
         - If time taken is within or below allocated time, no deduction applies.\n\
         - The more time taken by the student exceeds the allocated time the more marks will be deducted.\n\
         Return the marks obtained and feedback for each question, in question order, and a single deduction value for time overrun.\n\
         If any question does not have an answer, give 0 marks and give hints of the solution as feedback.\n\
         Questions:\n\
         {questions}\n\
         Student Answers:\n\
         {answers}\n\
         Allocated Time:\n\
         {total_time} minutes\n\
         Time Taken:\n\
         {elapsed_minutes:.2} minutes\n",
        questions = format_question_list(questions),
    )
}
