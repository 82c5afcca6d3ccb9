//! examforge-web: the two-stage exam form served over HTTP.
//!
//! Stage 1 collects the exam parameters and shows the generated questions;
//! stage 2 collects the answers and shows the graded report. The exam
//! started in stage 1 is kept in a [`SessionStore`] keyed by a cookie.

pub mod error;
pub mod html;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use examforge_core::ExamEngine;

pub use error::WebError;
pub use session::SessionStore;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ExamEngine>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(engine: ExamEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions: SessionStore::new(),
        }
    }
}

/// The full application router with request tracing.
pub fn router(state: AppState) -> Router {
    routes::create_router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("examforge listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
