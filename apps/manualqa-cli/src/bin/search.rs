use std::env;

use clap::Parser;

use manualqa_cli::init_tracing;
use manualqa_core::config::Config;
use manualqa_retrieval::QueryService;

#[derive(Parser, Debug)]
#[command(name = "manualqa-search", about = "Show how a question is routed and which pages it retrieves")]
struct Args {
    question: String,
    /// Also generate the answer.
    #[arg(long)]
    answer: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = Config::load()?.settings()?;
    let base = env::current_dir()?;
    let service = QueryService::from_settings(&settings, &base).await?;

    println!("🔍 manualqa-search\n=================");
    println!("Query: {}", args.question);
    let retrieval = service.retrieve(&args.question).await;
    println!("Route: {:?}", retrieval.kind);
    println!("\n🔍 Retrieved {} pages", retrieval.chunks.len());
    for (i, chunk) in retrieval.chunks.iter().enumerate() {
        let preview: String = chunk.text.chars().take(160).collect();
        println!("\n  {}. page={}  id={}", i + 1, chunk.page, chunk.id);
        println!("     📝 {}", preview);
    }

    if args.answer {
        let answer = service.ask(&args.question).await;
        println!("\n💬 {}", answer.answer);
        println!("   pages: {:?}", answer.pages);
    }
    Ok(())
}
