//! # contract: the seam between the pipeline and the text-generation service
//!
//! This module defines the single capability the pipeline needs from a language
//! model (`TextGenerator`) plus the plain data types that flow between the
//! dispatcher and the document writer.
//!
//! ## Interface & Extensibility
//! - Implement [`TextGenerator`] to plug in a provider (HTTP API, local model, fake).
//! - Provider specific request/response types stay inside the implementor; the
//!   pipeline only ever sees a prompt string going in and text or a
//!   [`ServiceError`] coming out.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate deterministic
//!   mocks (`MockTextGenerator`) for unit/integration tests.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;

/// Failure of a single call to the text-generation service.
///
/// Always scoped to one annotation task: the dispatcher turns it into an error
/// description for that table and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Connection, DNS, TLS or body-read failure.
    Transport(String),
    /// The request did not finish within the configured timeout.
    Timeout,
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The response could not be decoded into documentation text.
    Malformed(String),
    /// The response decoded fine but carried no text.
    Empty,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transport(msg) => write!(f, "transport error: {msg}"),
            ServiceError::Timeout => write!(f, "request timed out"),
            ServiceError::Status { status, body } => {
                write!(f, "service returned status {status}: {body}")
            }
            ServiceError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            ServiceError::Empty => write!(f, "service returned an empty response"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// The one capability the pipeline needs from a language model.
///
/// Implementations are shared by reference across concurrent annotation calls,
/// hence `Send + Sync`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Turn a prompt into generated text. Called exactly once per annotation task.
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Identifies what an annotation task documents, and therefore which sentinel
/// closes its block in the output document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskKey {
    /// All statements that target one table.
    Table(String),
    /// A single statement, numbered from zero in source order.
    Segment(usize),
}

impl TaskKey {
    /// The marker line written after this task's documentation block.
    pub fn sentinel(&self) -> String {
        match self {
            TaskKey::Table(name) => format!("--- Fin de {name} ---"),
            TaskKey::Segment(_) => "--- Fin de Segmento ---".to_string(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::Table(name) => f.write_str(name),
            TaskKey::Segment(index) => write!(f, "segment #{index}"),
        }
    }
}

/// One unit of work for the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTask {
    pub key: TaskKey,
    /// The statements of the group, in source order, joined with `\n`.
    pub sql: String,
}

/// The outcome of exactly one [`AnnotationTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationResult {
    pub key: TaskKey,
    pub outcome: Result<String, ServiceError>,
}

impl AnnotationResult {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }

    /// The text placed above the sentinel: the documentation itself, or a
    /// description of why there is none.
    pub fn body(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(e) => format!("**ERROR:** no se pudo generar la documentación de {}: {e}", self.key),
        }
    }
}
