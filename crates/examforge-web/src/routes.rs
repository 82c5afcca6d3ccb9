use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use examforge_core::model::ExamParams;
use examforge_core::ExamError;

use crate::error::{Result, WebError};
use crate::html::{evaluation_page, index_page, questions_page, FormDefaults};
use crate::session::{session_cookie, session_key_from_cookie};
use crate::AppState;

/// Stage 1 submission.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub subject: String,
    pub topic: String,
    pub num_questions: u32,
    pub marks_per_question: u32,
    pub total_time: u32,
    #[serde(default)]
    pub comment: String,
}

impl GenerateForm {
    fn into_params(self) -> Result<ExamParams> {
        for (field, value) in [
            ("number of questions", self.num_questions),
            ("marks per question", self.marks_per_question),
            ("total time", self.total_time),
        ] {
            if value < 1 {
                return Err(WebError::BadRequest(format!("{field} must be at least 1")));
            }
        }
        Ok(ExamParams {
            subject: self.subject,
            topic: self.topic,
            num_questions: self.num_questions,
            marks_per_question: self.marks_per_question,
            total_time: self.total_time,
            comment: self.comment,
        })
    }
}

/// Stage 2 submission.
#[derive(Debug, Deserialize)]
pub struct EvaluateForm {
    #[serde(default)]
    pub answers: String,
    /// Left blank, the time the exam was generated with is used.
    #[serde(default)]
    pub total_time: Option<String>,
}

impl EvaluateForm {
    fn total_time(&self) -> Result<Option<u32>> {
        match self.total_time.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<u32>() {
                Ok(minutes) if minutes >= 1 => Ok(Some(minutes)),
                _ => Err(WebError::BadRequest(format!(
                    "total time must be a whole number of minutes, at least 1 (got '{raw}')"
                ))),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/evaluate", post(evaluate))
        .route("/health", get(health))
        .with_state(state)
}

fn session_key(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_key_from_cookie)
}

fn bad_form(rejection: FormRejection) -> WebError {
    WebError::BadRequest(rejection.body_text())
}

async fn index() -> Html<String> {
    Html(index_page(&FormDefaults::default()))
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: std::result::Result<Form<GenerateForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(bad_form)?;
    let params = form.into_params()?;

    let exam = state.engine.generate_questions(params).await?;
    let page = questions_page(&exam.session.params, &exam.rendered);

    let key = session_key(&headers).unwrap_or_else(Uuid::new_v4);
    tracing::info!(session = %key, questions = exam.session.questions.len(), "exam stored");
    state.sessions.insert(key, exam.session);

    Ok(([(header::SET_COOKIE, session_cookie(key))], Html(page)).into_response())
}

async fn evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: std::result::Result<Form<EvaluateForm>, FormRejection>,
) -> Result<Html<String>> {
    let Form(form) = form.map_err(bad_form)?;
    let total_time = form.total_time()?;

    let key = session_key(&headers).ok_or(ExamError::MissingSession)?;
    let session = state.sessions.get(&key).ok_or(ExamError::MissingSession)?;
    let total_time = total_time.unwrap_or(session.params.total_time);

    let outcome = state
        .engine
        .evaluate_answers(&session, &form.answers, total_time)
        .await?;
    state.sessions.remove(&key);

    Ok(Html(evaluation_page(&outcome.rendered)))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(num_questions: u32, marks: u32, time: u32) -> GenerateForm {
        GenerateForm {
            subject: "Chemistry".into(),
            topic: "Bonds".into(),
            num_questions,
            marks_per_question: marks,
            total_time: time,
            comment: String::new(),
        }
    }

    #[test]
    fn generate_form_bounds() {
        assert!(form(1, 1, 1).into_params().is_ok());
        for bad in [form(0, 10, 60), form(5, 0, 60), form(5, 10, 0)] {
            assert!(matches!(bad.into_params(), Err(WebError::BadRequest(_))));
        }
    }

    #[test]
    fn evaluate_form_total_time() {
        let with = |t: Option<&str>| EvaluateForm {
            answers: String::new(),
            total_time: t.map(String::from),
        };
        assert_eq!(with(None).total_time().unwrap(), None);
        assert_eq!(with(Some(" ")).total_time().unwrap(), None);
        assert_eq!(with(Some("30")).total_time().unwrap(), Some(30));
        assert!(with(Some("0")).total_time().is_err());
        assert!(with(Some("ten")).total_time().is_err());
    }

    #[test]
    fn session_key_from_headers() {
        let key = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(session_key(&headers), None);
        headers.insert(
            header::COOKIE,
            format!("examforge_session={key}").parse().unwrap(),
        );
        assert_eq!(session_key(&headers), Some(key));
    }
}
