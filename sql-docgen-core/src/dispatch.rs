//! Bounded concurrent dispatch of annotation tasks to a [`TextGenerator`].
//!
//! Every task becomes exactly one call to the generator and exactly one
//! [`AnnotationResult`]. A failing call only affects its own result: the error is
//! recorded in the result and the remaining tasks keep flowing.
//!
//! At most `limit` calls are in flight at any moment. With
//! [`OutputOrder::Completion`] results are yielded as they finish; with
//! [`OutputOrder::Submission`] they are yielded in task order.

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::OutputOrder;
use crate::contract::{AnnotationResult, AnnotationTask, ServiceError, TaskKey, TextGenerator};
use crate::group::TableGroups;
use crate::prompt::build_prompt;
use crate::segment::Statement;

/// One task per named group, in the groups' enumeration order. The unassigned
/// bucket is never turned into a task.
pub fn table_tasks(groups: &TableGroups) -> Vec<AnnotationTask> {
    groups
        .named()
        .map(|(table, statements)| AnnotationTask {
            key: TaskKey::Table(table.to_string()),
            sql: join_statements(statements),
        })
        .collect()
}

/// One task per statement, in source order.
pub fn segment_tasks(statements: &[Statement]) -> Vec<AnnotationTask> {
    statements
        .iter()
        .enumerate()
        .map(|(index, statement)| AnnotationTask {
            key: TaskKey::Segment(index),
            sql: statement.as_str().to_string(),
        })
        .collect()
}

fn join_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(Statement::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Annotate every named group of `groups`.
pub fn dispatch<'a, G>(
    groups: &TableGroups,
    limit: usize,
    order: OutputOrder,
    generator: &'a G,
) -> BoxStream<'a, AnnotationResult>
where
    G: TextGenerator + ?Sized,
{
    dispatch_tasks(table_tasks(groups), limit, order, generator)
}

/// Run `tasks` against `generator` with at most `limit` calls in flight.
///
/// The returned stream yields exactly `tasks.len()` results.
pub fn dispatch_tasks<'a, G>(
    tasks: Vec<AnnotationTask>,
    limit: usize,
    order: OutputOrder,
    generator: &'a G,
) -> BoxStream<'a, AnnotationResult>
where
    G: TextGenerator + ?Sized,
{
    let limit = limit.max(1);
    info!(tasks = tasks.len(), limit, %order, "[DISPATCH] Submitting annotation tasks");

    let calls = stream::iter(tasks).map(move |task| annotate(task, generator));
    match order {
        OutputOrder::Completion => calls.buffer_unordered(limit).boxed(),
        OutputOrder::Submission => calls.buffered(limit).boxed(),
    }
}

async fn annotate<G>(task: AnnotationTask, generator: &G) -> AnnotationResult
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_prompt(&task.sql);
    debug!(key = %task.key, prompt_len = prompt.len(), "[DISPATCH] Calling text generator");

    let outcome = match generator.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => Err(ServiceError::Empty),
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(text) => info!(key = %task.key, chars = text.len(), "[DISPATCH] Annotation finished"),
        Err(e) => warn!(key = %task.key, error = %e, "[DISPATCH] Annotation failed, recording error"),
    }

    AnnotationResult {
        key: task.key,
        outcome,
    }
}
