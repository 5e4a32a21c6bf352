use anyhow::Result;
use clap::Parser;
use sql_docgen::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // OPENAI_API_KEY may live in .env
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::info!(
        input = %cli.input_sql.display(),
        output = %cli.output_md.display(),
        "[CLI] sql-docgen starting"
    );

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "[CLI][ERROR] sql-docgen failed");
    }
    result
}
