use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_WORKERS: usize = 4;

/// How results are written relative to the order tasks were submitted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// Write each block as soon as its task finishes.
    #[default]
    Completion,
    /// Hold finished blocks until every earlier task has been written.
    Submission,
}

/// What one annotation task covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationScope {
    /// One task per table, built from every statement that targets it.
    #[default]
    Table,
    /// One task per statement, attributable to a table or not.
    Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Upper bound on concurrently in-flight service calls. `0` behaves as `1`.
    pub workers: usize,
    pub order: OutputOrder,
    pub scope: AnnotationScope,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            order: OutputOrder::default(),
            scope: AnnotationScope::default(),
        }
    }
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            workers = self.workers,
            order = %self.order,
            scope = %self.scope,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

impl fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputOrder::Completion => f.write_str("completion"),
            OutputOrder::Submission => f.write_str("submission"),
        }
    }
}

impl FromStr for OutputOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "completion" | "completed" => Ok(OutputOrder::Completion),
            "submission" | "submitted" => Ok(OutputOrder::Submission),
            other => Err(format!("unknown output order: {other} (expected completion|submission)")),
        }
    }
}

impl fmt::Display for AnnotationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationScope::Table => f.write_str("table"),
            AnnotationScope::Segment => f.write_str("segment"),
        }
    }
}

impl FromStr for AnnotationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(AnnotationScope::Table),
            "segment" => Ok(AnnotationScope::Segment),
            other => Err(format!("unknown annotation scope: {other} (expected table|segment)")),
        }
    }
}
