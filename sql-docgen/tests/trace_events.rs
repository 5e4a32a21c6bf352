mod support;

use async_trait::async_trait;
use serial_test::serial;
use sql_docgen_core::config::PipelineConfig;
use sql_docgen_core::contract::{ServiceError, TextGenerator};
use sql_docgen_core::pipeline::document_sql;
use support::RunLog;

struct FixedGenerator;

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Ok("**TABLA**".to_string())
    }
}

#[tokio::test]
#[serial]
async fn emits_trace_initialised_and_fatal_read_events() {
    let (log, subscriber) = RunLog::install();
    let _guard = tracing::subscriber::set_default(subscriber);
    std::env::set_var("OPENAI_API_KEY", "sk-test-not-used");

    use sql_docgen::cli::{run, Cli};

    let cli = Cli {
        input_sql: std::path::PathBuf::from("definitely_missing_input.sql"),
        output_md: std::env::temp_dir().join("sql_docgen_trace_events_unused.md"),
        model: None,
        workers: None,
        order: None,
        scope: None,
        config: None,
    };

    let result = run(cli).await;
    assert!(result.is_err(), "missing input must fail the run");

    assert!(log.saw("trace_initialised"), "got: {:?}", log.messages());
    assert!(log.saw("Failed to read input"), "got: {:?}", log.messages());
}

#[tokio::test]
async fn reports_progress_once_per_table() {
    let (log, subscriber) = RunLog::install();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut doc: Vec<u8> = Vec::new();
    let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT); ALTER TABLE a ADD x INT; SELECT 1;";
    let report = document_sql(sql, &mut doc, &PipelineConfig::default(), &FixedGenerator)
        .await
        .unwrap();
    assert_eq!(report.tasks, 2);

    assert_eq!(log.count("Documentation block written"), 2, "got: {:?}", log.messages());
    assert!(log.saw("not documented"), "got: {:?}", log.messages());
}
