//! The generate → evaluate pipeline.
//!
//! Each operation is one provider call: build the prompt, call the model
//! under a timeout, coerce the reply into its schema, then render. There are
//! no retries; a failed call fails the operation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::error::ExamError;
use crate::model::{EvaluationResults, ExamParams, Questions};
use crate::prompt::{evaluation_prompt, generation_prompt};
use crate::report::{render_evaluation, render_questions, ScoreSummary};
use crate::schema::{coerce, StructuredOutput};
use crate::session::ExamSession;
use crate::traits::{GenerateRequest, LlmProvider};

/// Configuration for the exam engine.
#[derive(Debug, Clone)]
pub struct ExamEngineConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Upper bound on a single provider call.
    pub request_timeout: Duration,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for ExamEngineConfig {
    fn default() -> Self {
        Self {
            model: "mistral-large-latest".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            request_timeout: Duration::from_secs(120),
            system_prompt_override: None,
        }
    }
}

/// Output of question generation.
#[derive(Debug, Clone)]
pub struct GeneratedExam {
    /// The question list as shown to the student.
    pub rendered: String,
    /// State to hand back to [`ExamEngine::evaluate_answers`].
    pub session: ExamSession,
}

/// Output of answer evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    /// The evaluation report as shown to the student.
    pub rendered: String,
    pub results: EvaluationResults,
    pub summary: ScoreSummary,
    pub elapsed_minutes: f64,
}

/// Generates exams and grades answer sheets through one LLM provider.
pub struct ExamEngine {
    provider: Arc<dyn LlmProvider>,
    config: ExamEngineConfig,
}

impl ExamEngine {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ExamEngineConfig) -> Self {
        Self { provider, config }
    }

    /// Ask the model for questions and start the exam clock.
    #[instrument(skip(self, params), fields(subject = %params.subject, topic = %params.topic))]
    pub async fn generate_questions(&self, params: ExamParams) -> Result<GeneratedExam, ExamError> {
        let prompt = generation_prompt(&params);
        let questions: Questions = self.invoke(prompt).await?;

        tracing::info!(
            requested = params.num_questions,
            received = questions.len(),
            "questions generated"
        );

        let rendered = render_questions(&params.subject, &params.topic, &questions, params.total_time);
        let session = ExamSession::new(params, questions, Utc::now());

        Ok(GeneratedExam { rendered, session })
    }

    /// Grade an answer sheet against the session's questions, timing the
    /// exam up to now.
    pub async fn evaluate_answers(
        &self,
        session: &ExamSession,
        answers: &str,
        total_time: u32,
    ) -> Result<EvaluationOutcome, ExamError> {
        self.evaluate_answers_at(session, answers, total_time, Utc::now())
            .await
    }

    /// Like [`Self::evaluate_answers`], with the end of the exam given explicitly.
    #[instrument(skip(self, session, answers), fields(session_id = %session.id))]
    pub async fn evaluate_answers_at(
        &self,
        session: &ExamSession,
        answers: &str,
        total_time: u32,
        now: DateTime<Utc>,
    ) -> Result<EvaluationOutcome, ExamError> {
        let elapsed = session.elapsed_minutes(now);
        let prompt = evaluation_prompt(answers, &session.questions, total_time, elapsed);
        let results: EvaluationResults = self.invoke(prompt).await?;

        if results.evaluations.len() != session.questions.len() {
            tracing::warn!(
                expected = session.questions.len(),
                actual = results.evaluations.len(),
                "evaluation count does not match question count"
            );
            return Err(ExamError::EvaluationCountMismatch {
                expected: session.questions.len(),
                actual: results.evaluations.len(),
            });
        }

        let summary = ScoreSummary::compute(&session.questions, &results);
        let rendered = render_evaluation(&session.questions, &results, total_time, elapsed);

        tracing::info!(
            elapsed_minutes = elapsed,
            total_obtained = summary.total_obtained,
            deduction = summary.deduction,
            final_score = summary.final_score,
            "answers evaluated"
        );

        Ok(EvaluationOutcome {
            rendered,
            results,
            summary,
            elapsed_minutes: elapsed,
        })
    }

    async fn invoke<T: StructuredOutput>(&self, prompt: String) -> Result<T, ExamError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: self.config.system_prompt_override.clone(),
            response_schema: Some(T::response_schema()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = tokio::time::timeout(self.config.request_timeout, self.provider.generate(&request))
            .await
            .map_err(|_| ExamError::TimedOut {
                secs: self.config.request_timeout.as_secs(),
            })?
            .map_err(ExamError::from_provider)?;

        tracing::debug!(
            provider = self.provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            total_tokens = response.token_usage.total_tokens,
            "model replied"
        );

        coerce::<T>(&response.content).inspect_err(|e| {
            tracing::warn!("{e}");
        })
    }
}
