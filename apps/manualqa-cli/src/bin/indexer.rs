use std::env;
use std::path::PathBuf;

use clap::Parser;

use manualqa_cli::{build_index, init_tracing};
use manualqa_core::config::Config;
use manualqa_embed::{get_default_embedder, EmbeddingGateway};

#[derive(Parser, Debug)]
#[command(name = "manualqa-indexer", about = "Embed manual pages and build the vector index")]
struct Args {
    /// `[{page, text}]` JSON; defaults to data.pages_path.
    #[arg(long)]
    pages: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let base = env::current_dir()?;
    let pages_path = args.pages.unwrap_or_else(|| settings.data.pages_path(&base));

    println!("Manual Indexer\n==============");
    println!("Pages: {}", pages_path.display());
    println!("Index: {}", settings.data.index_dir(&base).display());

    let embedder = EmbeddingGateway::new(get_default_embedder(&settings.embedding, &settings.oracle)?);
    let report = build_index(&settings, &base, &pages_path, &embedder, true).await?;

    println!("\n✅ Indexing completed successfully!");
    println!("📊 Indexed {} pages", report.indexed);
    if report.skipped > 0 {
        println!("⚠️  Skipped {} pages whose embedding failed", report.skipped);
    }
    println!("💡 To try a query, use: cargo run --bin manualqa-search '<question>'");
    Ok(())
}
