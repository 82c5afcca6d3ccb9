//! examforge-core: exam model, prompts, structured-output coercion, and scoring.
//!
//! This crate defines the data model, the provider trait, and the
//! generate → evaluate pipeline that the web form and CLI build on.

pub mod engine;
pub mod error;
pub mod model;
pub mod prompt;
pub mod report;
pub mod schema;
pub mod session;
pub mod timing;
pub mod traits;

pub use engine::{EvaluationOutcome, ExamEngine, ExamEngineConfig, GeneratedExam};
pub use error::{ExamError, ProviderError};
pub use session::ExamSession;
