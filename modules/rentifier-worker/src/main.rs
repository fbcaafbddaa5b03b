use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rentifier_common::Config;
use rentifier_store::Store;
use rentifier_worker::connectors::Yad2Connector;
use rentifier_worker::{cancel, Collector, Notifier, Processor, Registry};
use telegram_client::TelegramClient;

#[derive(Parser)]
#[command(name = "rentifier-worker", about = "Listing pipeline jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull new candidates from every enabled source.
    Collect,
    /// Normalize raw candidates into canonical listings.
    Process,
    /// Deliver new matches to users.
    Notify,
    /// Run schema migrations and exit.
    Migrate,
    /// Seed the source row and the monitored-city list.
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rentifier=info".parse()?))
        .init();

    match Cli::parse().command {
        Command::Collect => run_collect().await,
        Command::Process => run_process().await,
        Command::Notify => run_notify().await,
        Command::Migrate => run_migrate().await,
        Command::Seed => run_seed().await,
    }
}

async fn run_collect() -> Result<()> {
    info!("Collector starting...");
    let config = Config::collector_from_env();
    config.log_redacted();

    let (store, cancelled) = connect(&config).await?;
    let registry = build_registry(&config);
    let run = RunLog::start("collect");

    let collector = Collector::new(store.clone(), registry, cancelled);
    let summary = collector.run().await?;
    info!("{summary}");

    run.save(&store, &summary).await;
    Ok(())
}

async fn run_process() -> Result<()> {
    info!("Processor starting...");
    let config = Config::processor_from_env();
    config.log_redacted();

    let (store, cancelled) = connect(&config).await?;
    let registry = build_registry(&config);
    let run = RunLog::start("process");

    let processor = Processor::new(store.clone(), registry, config.processor_batch_size, cancelled);
    let summary = processor.run().await?;
    info!("{summary}");

    run.save(&store, &summary).await;
    Ok(())
}

async fn run_notify() -> Result<()> {
    info!("Notifier starting...");
    let config = Config::notifier_from_env();
    config.log_redacted();

    let (store, cancelled) = connect(&config).await?;
    let transport = Arc::new(TelegramClient::new(config.telegram_bot_token.clone()));
    let run = RunLog::start("notify");

    let notifier = Notifier::new(store.clone(), transport, cancelled);
    let summary = notifier.run().await?;
    info!("{summary}");

    run.save(&store, &summary).await;
    Ok(())
}

async fn run_migrate() -> Result<()> {
    let config = Config::collector_from_env();
    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;
    info!("Migrations applied");
    Ok(())
}

/// The cities the reference connector crawls, highest priority first.
/// Codes are the marketplace's own city identifiers.
const SEED_CITIES: &[(&str, i32, i32)] = &[
    ("תל אביב", 5000, 100),
    ("ירושלים", 3000, 90),
    ("חיפה", 4000, 80),
    ("רמת גן", 8600, 70),
    ("פתח תקווה", 7900, 60),
    ("ראשון לציון", 8300, 50),
    ("באר שבע", 9000, 40),
    ("נתניה", 7400, 30),
    ("חולון", 6600, 20),
    ("בת ים", 6200, 10),
];

async fn run_seed() -> Result<()> {
    let config = Config::collector_from_env();
    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;

    let source = store.seed_source(Yad2Connector::SOURCE_NAME).await?;
    info!(source = %source.name, id = %source.id, "Source seeded");

    for (name, code, priority) in SEED_CITIES {
        store.seed_city(name, *code, *priority).await?;
    }
    info!(cities = SEED_CITIES.len(), "Monitored cities seeded");

    // Local smoke setup: a user plus an unconstrained filter, so the
    // notifier has someone to talk to without the chat UI running.
    if let Ok(chat_id) = std::env::var("DEMO_CHAT_ID") {
        let chat_id: i64 = chat_id.parse()?;
        let user = store.seed_user(chat_id, Some("demo")).await?;
        let filter_id = store
            .insert_filter(&rentifier_store::NewFilter {
                user_id: user.id,
                name: "everything".to_string(),
                ..Default::default()
            })
            .await?;
        info!(chat_id, filter = %filter_id, "Demo user and filter seeded");
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<(Arc<Store>, Arc<AtomicBool>)> {
    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;

    let cancelled = Arc::new(AtomicBool::new(false));
    cancel::spawn_deadline(cancelled.clone(), config.run_deadline_secs);
    Ok((Arc::new(store), cancelled))
}

fn build_registry(config: &Config) -> Arc<Registry> {
    let mut registry = Registry::new();
    if config.yad2_enabled {
        registry.register(Arc::new(Yad2Connector::new(config.yad2_base_url.as_deref())));
    }
    if registry.is_empty() {
        warn!("No connectors enabled");
    }
    Arc::new(registry)
}

/// Minimal run-log handle: failures to persist are warnings, never job
/// failures.
struct RunLog {
    job: &'static str,
    run_id: Uuid,
    started_at: DateTime<Utc>,
}

impl RunLog {
    fn start(job: &'static str) -> Self {
        Self {
            job,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    async fn save<S: Serialize>(&self, store: &Store, summary: &S) {
        let summary = match serde_json::to_value(summary) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to serialize run summary");
                return;
            }
        };
        if let Err(e) = store
            .record_job_run(self.job, self.run_id, self.started_at, &summary)
            .await
        {
            warn!(job = self.job, error = %e, "Failed to save run log");
        }
    }
}
