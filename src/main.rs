//! kaznews-bot — Binary Entrypoint
//! Loads configuration, wires the pipeline context, and runs the poll loop.
//!
//! The process exits only on unrecoverable startup configuration errors.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kaznews_bot::config::{Config, CHECK_INTERVAL, RSS_FEEDS};
use kaznews_bot::feed::HttpFeedSource;
use kaznews_bot::filter::Eligibility;
use kaznews_bot::ledger::Ledger;
use kaznews_bot::pipeline::Pipeline;
use kaznews_bot::publish::TelegramPublisher;
use kaznews_bot::scheduler::run_forever;
use kaznews_bot::transform::TogetherRewriter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("startup failed: {e}"))?;

    let ledger = Ledger::load(&config.ledger_path)
        .map_err(|e| anyhow::anyhow!("startup failed: {e}"))?;
    tracing::info!(
        links = ledger.len(),
        path = %config.ledger_path,
        "ledger loaded"
    );

    let gate = Eligibility::new(config.keywords.clone(), config.freshness_window());
    let transformer = TogetherRewriter::new(
        config.together_api_key.clone(),
        config.together_model.clone(),
    );
    let publisher = TelegramPublisher::new(
        config.bot_token.clone(),
        config.channel.clone(),
        config.admin_id,
    );

    let pipeline = Pipeline::new(
        RSS_FEEDS.iter().map(|s| s.to_string()).collect(),
        Box::new(HttpFeedSource::new()),
        gate,
        Box::new(transformer),
        Box::new(publisher),
        ledger,
    );

    run_forever(pipeline, CHECK_INTERVAL).await;
    Ok(())
}
