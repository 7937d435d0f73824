use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vestnik::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Mutation logs go to stderr so they never mix into table or JSON
    // output. Quiet by default; RUST_LOG=info shows the audit trail.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
