//! High-level pipeline: orchestrates segment → group → dispatch → write for one SQL dump.
//!
//! This module ties the pipeline stages together for a single run:
//!   - Splits the dump into statements ([`crate::segment`])
//!   - Groups statements per target table ([`crate::group`])
//!   - Dispatches one annotation task per table, or per statement in segment
//!     scope, through a bounded pool ([`crate::dispatch`])
//!   - Appends every result to the output document as it arrives ([`crate::writer`])
//!
//! # Error Handling
//! Only I/O on the input or output file is fatal and surfaces as a [`PipelineError`].
//! Service failures are recorded per task inside the document; statements
//! without a recoverable table are counted in the [`RunReport`].
//!
//! # Navigation
//! - Main entrypoints: [`document_file`], [`document_sql`]
//! - Supporting types: [`RunReport`], [`PipelineError`]

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, BufWriter};
use tracing::{error, info, warn};

use crate::config::{AnnotationScope, PipelineConfig};
use crate::contract::TextGenerator;
use crate::dispatch::{dispatch_tasks, segment_tasks, table_tasks};
use crate::group::group;
use crate::segment::segment;
use crate::writer::write_results;

#[derive(Debug)]
pub enum PipelineError {
    ReadInput { path: PathBuf, source: io::Error },
    CreateOutput { path: PathBuf, source: io::Error },
    WriteOutput(io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ReadInput { path, source } => {
                write!(f, "failed to read input {}: {source}", path.display())
            }
            PipelineError::CreateOutput { path, source } => {
                write!(f, "failed to create output {}: {source}", path.display())
            }
            PipelineError::WriteOutput(source) => write!(f, "failed to write output: {source}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::ReadInput { source, .. } | PipelineError::CreateOutput { source, .. } => {
                Some(source)
            }
            PipelineError::WriteOutput(source) => Some(source),
        }
    }
}

impl From<io::Error> for PipelineError {
    fn from(e: io::Error) -> Self {
        PipelineError::WriteOutput(e)
    }
}

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub statements: usize,
    pub tables: usize,
    /// Statements with no recoverable table name.
    pub unassigned: usize,
    pub tasks: usize,
    pub written: usize,
    pub failed: usize,
}

/// Document one SQL dump held in memory, writing blocks to `sink`.
pub async fn document_sql<G, W>(
    sql: &str,
    sink: W,
    config: &PipelineConfig,
    generator: &G,
) -> Result<RunReport, PipelineError>
where
    G: TextGenerator + ?Sized,
    W: AsyncWrite + Unpin,
{
    let statements = segment(sql);
    let groups = group(statements.iter().cloned());
    info!(
        statements = statements.len(),
        tables = groups.named_len(),
        unassigned = groups.unassigned().len(),
        "[PIPELINE] Segmented and grouped input"
    );

    let tasks = match config.scope {
        AnnotationScope::Table => {
            if !groups.unassigned().is_empty() {
                warn!(
                    count = groups.unassigned().len(),
                    "[PIPELINE] Statements without a recoverable table are not documented"
                );
            }
            table_tasks(&groups)
        }
        AnnotationScope::Segment => segment_tasks(&statements),
    };
    let task_count = tasks.len();

    let results = dispatch_tasks(tasks, config.workers, config.order, generator);
    let summary = write_results(results, sink, task_count).await?;

    Ok(RunReport {
        statements: statements.len(),
        tables: groups.named_len(),
        unassigned: groups.unassigned().len(),
        tasks: task_count,
        written: summary.written,
        failed: summary.failed,
    })
}

/// Document the SQL dump at `input` into a new file at `output`.
///
/// The output's parent directory is created when missing; an existing output
/// file is truncated.
pub async fn document_file<G>(
    input: &Path,
    output: &Path,
    config: &PipelineConfig,
    generator: &G,
) -> Result<RunReport, PipelineError>
where
    G: TextGenerator + ?Sized,
{
    info!(input = %input.display(), output = %output.display(), "[PIPELINE] Starting documentation run");

    let sql = tokio::fs::read_to_string(input).await.map_err(|source| {
        error!(error = ?source, input = %input.display(), "[PIPELINE][ERROR] Failed to read input");
        PipelineError::ReadInput {
            path: input.to_path_buf(),
            source,
        }
    })?;

    let create_output = |source: io::Error| {
        error!(error = ?source, output = %output.display(), "[PIPELINE][ERROR] Failed to create output");
        PipelineError::CreateOutput {
            path: output.to_path_buf(),
            source,
        }
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(create_output)?;
    }
    let file = tokio::fs::File::create(output).await.map_err(create_output)?;

    let report = document_sql(&sql, BufWriter::new(file), config, generator).await?;
    info!(?report, "[PIPELINE] Documentation run complete");
    Ok(report)
}
