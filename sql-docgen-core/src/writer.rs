//! Append-only output document.
//!
//! The writer is the only owner of the destination handle. Each result is written
//! as `<body>\n\n<sentinel>\n\n` and flushed straight away, so an interrupted run
//! still leaves every finished block readable on disk.

use std::io;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::contract::AnnotationResult;

/// Totals for one finished document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub failed: usize,
}

/// Render one result exactly as it appears in the document.
pub fn format_block(result: &AnnotationResult) -> String {
    format!("{}\n\n{}\n\n", result.body(), result.key.sentinel())
}

pub struct DocumentWriter<W> {
    sink: W,
    expected: usize,
    summary: WriteSummary,
}

impl<W> DocumentWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// `expected` is only used for progress reporting.
    pub fn new(sink: W, expected: usize) -> Self {
        Self {
            sink,
            expected,
            summary: WriteSummary::default(),
        }
    }

    pub async fn append(&mut self, result: &AnnotationResult) -> io::Result<()> {
        let block = format_block(result);
        if let Err(e) = self.write_flushed(block.as_bytes()).await {
            error!(key = %result.key, error = ?e, "[WRITE][ERROR] Failed to append documentation block");
            return Err(e);
        }

        self.summary.written += 1;
        if result.is_failure() {
            self.summary.failed += 1;
            warn!(key = %result.key, "[WRITE] Wrote error description in place of documentation");
        }
        info!(
            key = %result.key,
            completed = self.summary.written,
            total = self.expected,
            "[WRITE] Documentation block written"
        );
        Ok(())
    }

    async fn write_flushed(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes).await?;
        self.sink.flush().await
    }

    /// Flush and close the destination.
    pub async fn finish(mut self) -> io::Result<WriteSummary> {
        self.sink.flush().await?;
        self.sink.shutdown().await?;
        Ok(self.summary)
    }
}

/// Drain `results` into `sink` in arrival order, then close it.
pub async fn write_results<S, W>(mut results: S, sink: W, expected: usize) -> io::Result<WriteSummary>
where
    S: Stream<Item = AnnotationResult> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut writer = DocumentWriter::new(sink, expected);
    while let Some(result) = results.next().await {
        writer.append(&result).await?;
    }
    writer.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ServiceError, TaskKey};
    use futures::stream;
    use std::time::Duration;
    use tokio::io::BufWriter;

    fn ok(table: &str, text: &str) -> AnnotationResult {
        AnnotationResult {
            key: TaskKey::Table(table.to_string()),
            outcome: Ok(text.to_string()),
        }
    }

    #[test]
    fn block_layout() {
        assert_eq!(format_block(&ok("Roles", "DOC")), "DOC\n\n--- Fin de Roles ---\n\n");
        let segment = AnnotationResult {
            key: TaskKey::Segment(0),
            outcome: Ok("DOC".into()),
        };
        assert_eq!(format_block(&segment), "DOC\n\n--- Fin de Segmento ---\n\n");
    }

    #[tokio::test]
    async fn writes_in_arrival_order_and_counts_failures() {
        let results = stream::iter(vec![
            ok("b", "second table"),
            AnnotationResult {
                key: TaskKey::Table("a".into()),
                outcome: Err(ServiceError::Timeout),
            },
        ]);
        let mut doc: Vec<u8> = Vec::new();
        let summary = write_results(results, &mut doc, 2).await.unwrap();

        assert_eq!(summary, WriteSummary { written: 2, failed: 1 });
        let doc = String::from_utf8(doc).unwrap();
        assert!(doc.starts_with("second table\n\n--- Fin de b ---\n\n"), "got: {doc}");
        assert!(doc.ends_with("--- Fin de a ---\n\n"), "got: {doc}");
        assert!(doc.contains("request timed out"), "got: {doc}");
    }

    #[tokio::test]
    async fn empty_stream_leaves_empty_document() {
        let mut doc: Vec<u8> = Vec::new();
        let summary = write_results(stream::iter(Vec::<AnnotationResult>::new()), &mut doc, 0).await.unwrap();
        assert_eq!(summary, WriteSummary::default());
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn finished_blocks_reach_disk_while_the_run_is_still_going() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.md");
        let file = tokio::fs::File::create(&path).await.unwrap();

        // The second task never finishes.
        let results = stream::iter(vec![ok("Roles", "DOC")]).chain(stream::pending());
        let run = write_results(results, BufWriter::new(file), 2);
        let interrupted = tokio::time::timeout(Duration::from_millis(200), run).await;
        assert!(interrupted.is_err(), "the stream never ends, so the write must not finish");

        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(on_disk, "DOC\n\n--- Fin de Roles ---\n\n");
    }
}
