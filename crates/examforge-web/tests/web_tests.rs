//! Drives the router end to end against a mock provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use examforge_core::model::{ExamParams, Question, Questions};
use examforge_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};
use examforge_core::{ExamEngine, ExamEngineConfig, ExamSession};
use examforge_providers::mock::MockProvider;
use examforge_web::{router, AppState};

const QUESTIONS: &str = r#"{"questions": [
    {"question_text": "Solve 2x + 3 = 7.", "marks": 10},
    {"question_text": "Factor x^2 - 9.", "marks": 10},
    {"question_text": "Is x < 2 when x = 1? Explain.", "marks": 10}
]}"#;

const EVALUATIONS: &str = r#"```json
{"evaluations": [
    {"marks_obtained": 10, "feedback": "Correct."},
    {"marks_obtained": 5, "feedback": "Partially factored."},
    {"marks_obtained": 0, "feedback": "No answer."}
], "deduction": 3}
```"#;

const STAGE_ONE: &str =
    "subject=Math&topic=Algebra&num_questions=3&marks_per_question=10&total_time=60&comment=";

fn app_with(provider: Arc<dyn LlmProvider>, timeout: Duration) -> (Router, AppState) {
    let config = ExamEngineConfig {
        request_timeout: timeout,
        ..Default::default()
    };
    let state = AppState::new(ExamEngine::new(provider, config));
    (router(state.clone()), state)
}

fn app() -> (Router, AppState) {
    app_with(
        Arc::new(MockProvider::exam(QUESTIONS, EVALUATIONS)),
        Duration::from_secs(5),
    )
}

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn cookie_of(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn index_shows_stage_one_form() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("action=\"/generate\""));
    assert!(html.contains("value=\"60\""));
}

#[tokio::test]
async fn health_reports_version() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn generate_then_evaluate() {
    let (app, state) = app();

    let response = app
        .clone()
        .oneshot(form_post("/generate", STAGE_ONE, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_of(&response);
    assert!(cookie.starts_with("examforge_session="));
    let html = body_text(response).await;
    assert!(html.contains("Generated Questions for Math - Algebra"));
    assert!(html.contains("Q3. Is x &lt; 2 when x = 1? Explain. (10 marks)"));
    assert!(html.contains("**Total Time:** 60 minutes"));
    assert_eq!(state.sessions.len(), 1);

    let response = app
        .oneshot(form_post(
            "/evaluate",
            "answers=x%3D2%0AIt%27s+%28x-3%29%28x%2B3%29&total_time=",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Marks Obtained: 5/10, Feedback: Partially factored."));
    assert!(html.contains("- Allocated Time: 60 minutes"));
    assert!(html.contains("- Marks Before Deduction: 15/30"));
    assert!(html.contains("- Marks After Time Deduction: 12/30"));
    assert!(html.contains("**Final Score**: 12/30"));
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn evaluate_without_session_is_bad_request() {
    let (app, _) = app();
    let response = app
        .oneshot(form_post("/evaluate", "answers=42", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("generate questions first"));
}

#[tokio::test]
async fn evaluate_with_unknown_session_is_bad_request() {
    let (app, _) = app();
    let cookie = format!("examforge_session={}", uuid::Uuid::new_v4());
    let response = app
        .oneshot(form_post("/evaluate", "answers=42", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn algebra_params() -> ExamParams {
    ExamParams {
        subject: "Math".into(),
        topic: "Algebra".into(),
        num_questions: 1,
        marks_per_question: 10,
        total_time: 60,
        comment: String::new(),
    }
}

#[tokio::test]
async fn expired_session_is_bad_request() {
    let (app, state) = app();
    let key = uuid::Uuid::new_v4();
    let questions = Questions {
        questions: vec![Question {
            question_text: "Solve 2x = 4.".into(),
            marks: 10,
        }],
    };
    // 60 minutes allotted, so the entry lapses after three hours.
    let started = Utc::now() - chrono::Duration::hours(4);
    state
        .sessions
        .insert(key, ExamSession::new(algebra_params(), questions, started));

    let cookie = format!("examforge_session={key}");
    let response = app
        .oneshot(form_post("/evaluate", "answers=1.+x%3D2", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn abandoned_exams_do_not_accumulate() {
    let (app, state) = app();
    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(form_post("/generate", STAGE_ONE, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(state.sessions.len(), 20);

    let later = Utc::now() + chrono::Duration::hours(4);
    let fresh = ExamSession::new(algebra_params(), Questions::default(), later);
    state.sessions.insert_at(uuid::Uuid::new_v4(), fresh, later);
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn zero_questions_rejected() {
    let (app, state) = app();
    let body = STAGE_ONE.replace("num_questions=3", "num_questions=0");
    let response = app
        .oneshot(form_post("/generate", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("number of questions must be at least 1"));
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn non_numeric_marks_rejected() {
    let (app, _) = app();
    let body = STAGE_ONE.replace("marks_per_question=10", "marks_per_question=ten");
    let response = app
        .oneshot(form_post("/generate", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparseable_reply_is_bad_gateway() {
    let (app, state) = app_with(
        Arc::new(MockProvider::with_fixed_response("I'd rather not.")),
        Duration::from_secs(5),
    );
    let response = app
        .oneshot(form_post("/generate", STAGE_ONE, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("Questions schema"));
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn count_mismatch_keeps_session() {
    let short = r#"{"evaluations": [{"marks_obtained": 4, "feedback": "ok"}], "deduction": 0}"#;
    let (app, state) = app_with(
        Arc::new(MockProvider::exam(QUESTIONS, short)),
        Duration::from_secs(5),
    );

    let response = app
        .clone()
        .oneshot(form_post("/generate", STAGE_ONE, None))
        .await
        .unwrap();
    let cookie = cookie_of(&response);

    let response = app
        .oneshot(form_post("/evaluate", "answers=x", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("expected 3 evaluations"));
    assert_eq!(state.sessions.len(), 1);
}

struct StalledProvider;

#[async_trait]
impl LlmProvider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        anyhow::bail!("unreachable")
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![]
    }
}

#[tokio::test(start_paused = true)]
async fn slow_provider_is_gateway_timeout() {
    let (app, _) = app_with(Arc::new(StalledProvider), Duration::from_secs(2));
    let response = app
        .oneshot(form_post("/generate", STAGE_ONE, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}
