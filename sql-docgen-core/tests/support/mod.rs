#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sql_docgen_core::contract::{ServiceError, TextGenerator};
use sql_docgen_core::extract::extract_table_name;

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// The table a prompt is about: the last `CREATE TABLE` in it, which comes after
/// the worked example.
pub(crate) fn table_in_prompt(prompt: &str) -> String {
    let at = prompt
        .rfind("CREATE TABLE")
        .expect("prompt should contain a CREATE TABLE statement");
    extract_table_name(&prompt[at..])
        .expect("prompt table should be extractable")
        .to_string()
}

/// Fake service answering `DOC:<table>`, counting concurrent entries.
#[derive(Default)]
pub(crate) struct EchoGenerator {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
    per_table_delay: HashMap<String, Duration>,
}

impl EchoGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub(crate) fn with_table_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            per_table_delay: delays
                .iter()
                .map(|(table, ms)| (table.to_string(), Duration::from_millis(*ms)))
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let table = table_in_prompt(prompt);
        let delay = self
            .per_table_delay
            .get(&table)
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("DOC:{table}"))
    }
}

/// `CREATE TABLE t0 ...; CREATE TABLE t1 ...; ...`
pub(crate) fn many_tables(count: usize) -> String {
    (0..count)
        .map(|i| format!("CREATE TABLE t{i:02} (id INT PRIMARY KEY);\n"))
        .collect()
}
