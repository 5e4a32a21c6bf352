/// Command line interface for sql-docgen: argument parsing, config merging and the
/// user-visible messages of a run.
///
/// All pipeline logic (segmentation, grouping, dispatch, document writing) lives in
/// the `sql-docgen-core` crate. This module only wires configuration, the service
/// adapter and the pipeline together.
///
/// - For command-line users: run the `sql-docgen` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::generate::OpenAiClient;
use crate::load_config::{load_config, Overrides};
use anyhow::Result;
use clap::Parser;
use sql_docgen_core::config::{AnnotationScope, OutputOrder};
use sql_docgen_core::pipeline::document_file;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "./data/teams_actual.sql";
pub const DEFAULT_OUTPUT: &str = "./documents/markdown_database.md";

/// CLI for sql-docgen: document a SQL schema dump table by table.
#[derive(Parser, Debug)]
#[clap(
    name = "sql-docgen",
    version,
    about = "Turn a SQL schema dump into per-table Markdown documentation using a language model"
)]
pub struct Cli {
    /// SQL dump to document
    #[clap(default_value = DEFAULT_INPUT)]
    pub input_sql: PathBuf,

    /// Markdown document to write (created or truncated)
    #[clap(default_value = DEFAULT_OUTPUT)]
    pub output_md: PathBuf,

    /// Text-generation model to invoke [default: gpt-3.5-turbo]
    #[clap(long)]
    pub model: Option<String>,

    /// Maximum number of concurrent service calls [default: 4]
    #[clap(long)]
    pub workers: Option<usize>,

    /// Write blocks as they complete, or in table order: completion | submission
    #[clap(long)]
    pub order: Option<OutputOrder>,

    /// Document per table, or per statement: table | segment
    #[clap(long)]
    pub scope: Option<AnnotationScope>,

    /// Optional YAML config file (service and pipeline sections)
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            workers: self.workers,
            order: self.order,
            scope: self.scope,
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref(), cli.overrides())?;
    config.pipeline.trace_loaded();

    let generator = OpenAiClient::new(config.service.clone())
        .map_err(|e| anyhow::anyhow!("Failed to construct text generation client: {e}"))?;

    println!(
        "Documentando '{}' con {} workers...",
        cli.input_sql.display(),
        config.pipeline.workers
    );
    match document_file(&cli.input_sql, &cli.output_md, &config.pipeline, &generator).await {
        Ok(report) => {
            tracing::info!(?report, "Documentation run complete");
            println!(
                "Archivo '{}' transcrito exitosamente a '{}'.",
                cli.input_sql.display(),
                cli.output_md.display()
            );
            if report.failed > 0 {
                println!(
                    "{} de {} bloques no pudieron documentarse; ver los mensajes de error en el documento.",
                    report.failed, report.tasks
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Documentation run failed");
            eprintln!("[ERROR] Error al transcribir el archivo: {e}");
            Err(anyhow::Error::new(e))
        }
    }
}
