use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use comment_analyzer::analysis::CommentAnalyzer;
use comment_analyzer::config::AppConfig;
use comment_analyzer::llm::OllamaClient;
use comment_analyzer::web;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comment_analyzer=info,tower_http=info".into()),
        )
        .init();

    info!("Loading configuration...");
    let config = AppConfig::load()?;

    let client = Arc::new(OllamaClient::new(&config.ollama)?);
    let analyzer = CommentAnalyzer::new(client, config.ollama.model.clone());
    info!(
        "Using Ollama at {} with model {}",
        config.ollama.endpoint, config.ollama.model
    );

    let router = web::create_router(web::state::AppState::new(analyzer));
    let addr = format!("{}:{}", config.web.host, config.web.port);
    info!("Comment analyzer API listening at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
