use anyhow::Result;
use clap::Parser;
use docsearch_core::{Analyzer, Corpus, Strategy};
use docsearch_server::{build_app, AppState, DEFAULT_MAX_DOCUMENT_BYTES};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server", about = "Document training and search service")]
struct Args {
    /// Host to bind
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    port: u16,
    /// Ranking strategy: bm25 or tfidf
    #[arg(long, env = "RANK_STRATEGY", default_value_t = Strategy::Bm25)]
    strategy: Strategy,
    /// Extra stopwords, comma-separated, matched case-sensitively
    #[arg(long, env = "EXTRA_STOPWORDS", value_delimiter = ',')]
    extra_stopwords: Vec<String>,
    /// Largest accepted upload per document, in bytes
    #[arg(long, env = "MAX_DOCUMENT_BYTES", default_value_t = DEFAULT_MAX_DOCUMENT_BYTES)]
    max_document_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let corpus = Corpus::with_analyzer(Analyzer::with_extra_stopwords(args.extra_stopwords));
    let app = build_app(AppState::new(corpus, args.strategy).with_max_document_bytes(args.max_document_bytes));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, strategy = %args.strategy, "doc-search service up and running");
    axum::serve(listener, app).await?;
    Ok(())
}
