use clap::Parser;
use docqa_cli::{Args, console};
use docqa_rag::RagSession;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut session = RagSession::builder()
        .config(args.rag_config()?)
        .completion_provider(args.completion_provider()?)
        .build()?;

    if let Some(path) = &args.file {
        match console::load_file(&mut session, path) {
            Ok(summary) => tracing::info!(
                source = %summary.source_name,
                chunk_count = summary.chunk_count,
                "document ready"
            ),
            Err(e) => eprintln!("Failed to build index: {e:#}"),
        }
    }

    console::run_console(&mut session).await
}
