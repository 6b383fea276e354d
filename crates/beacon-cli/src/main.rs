use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use beacon_core::domain::{ChangeEvent, DispatchOutcome};
use beacon_core::impls::{DryRunPushGateway, InMemoryTokenRegistry};
use beacon_core::{EngineBuilder, NotifierConfig};

/// Replay document change events through the notification engine.
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
struct Args {
    /// Notifier configuration (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of registered recipient tokens.
    #[arg(short, long)]
    tokens: PathBuf,

    /// Change events, one JSON object per line.
    #[arg(short, long)]
    events: PathBuf,

    /// Log filter when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // (A) config と registry を用意
    let config = match &args.config {
        Some(path) => NotifierConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NotifierConfig::default(),
    };

    let registry = Arc::new(InMemoryTokenRegistry::new());
    let seed = tokio::fs::read_to_string(&args.tokens)
        .await
        .with_context(|| format!("reading tokens {}", args.tokens.display()))?;
    let seeded = registry.seed_from_json(&seed).await?;
    info!(tokens = seeded, "registry seeded");

    let engine = Arc::new(
        EngineBuilder::new(config)
            .registry(registry.clone())
            .gateway(Arc::new(DryRunPushGateway::new()))
            .build()?,
    );

    // (B) イベントを読み込む（壊れた行は行番号付きでエラー）
    let input = tokio::fs::read_to_string(&args.events)
        .await
        .with_context(|| format!("reading events {}", args.events.display()))?;
    let mut events = Vec::new();
    for (lineno, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: ChangeEvent = serde_json::from_str(line)
            .with_context(|| format!("{}:{}", args.events.display(), lineno + 1))?;
        events.push((lineno + 1, event));
    }

    // (C) イベントごとに独立した task で処理して、全部を join
    let mut handlers = JoinSet::new();
    for (lineno, event) in events {
        let engine = Arc::clone(&engine);
        handlers.spawn(async move { (lineno, engine.handle(&event).await) });
    }

    let mut results = Vec::new();
    while let Some(joined) = handlers.join_next().await {
        results.push(joined.context("event handler panicked")?);
    }
    results.sort_by_key(|(lineno, _)| *lineno);

    // (D) 結果を出力
    let mut delivered = 0usize;
    let mut failed = 0usize;
    for (lineno, result) in &results {
        match result {
            Ok(DispatchOutcome::Delivered(report)) => {
                delivered += 1;
                println!(
                    "line {lineno}: delivered to {} ({} ok, {} failed, {} pruned)",
                    report.recipients,
                    report.success_count,
                    report.failure_count,
                    report.reconcile.deleted.len()
                );
            }
            Ok(DispatchOutcome::NoRecipients) => println!("line {lineno}: no recipients"),
            Ok(DispatchOutcome::Skipped { reason }) => {
                println!("line {lineno}: skipped ({reason:?})")
            }
            Err(e) => {
                failed += 1;
                error!(line = lineno, error = %e, "event handling failed");
                println!("line {lineno}: error: {e}");
            }
        }
    }
    println!(
        "events={} delivered={} failed={} tokens_remaining={}",
        results.len(),
        delivered,
        failed,
        registry.len().await
    );

    Ok(())
}
