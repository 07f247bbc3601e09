//! `gpuwatch-collector` -- simulated GPU telemetry producer.
//!
//! Publishes one sample per GPU per node onto the telemetry topic every
//! poll interval. See [`CollectorConfig`] for the environment variables.

use anyhow::Context;
use gpuwatch_collector::config::CollectorConfig;
use gpuwatch_collector::publisher;
use gpuwatch_collector::simulator::Simulator;
use gpuwatch_events::PgTopic;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = CollectorConfig::from_env().context("Invalid collector configuration")?;
    tracing::info!(
        topic = %config.topic,
        nodes = ?config.nodes,
        gpus_per_node = config.gpus_per_node,
        "Starting gpuwatch-collector",
    );

    let pool = gpuwatch_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    gpuwatch_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let topic = PgTopic::new(pool.clone(), &config.topic);
    let simulator = Simulator::new(config.gpus_per_node);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received SIGINT (Ctrl-C), stopping"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping"),
        }
        signal_cancel.cancel();
    });
    #[cfg(unix)]
    {
        let term_cancel = cancel.clone();
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;
        tokio::spawn(async move {
            term.recv().await;
            tracing::info!("Received SIGTERM, stopping");
            term_cancel.cancel();
        });
    }

    publisher::run(&topic, &simulator, &config.nodes, config.poll_interval, cancel).await;

    pool.close().await;
    tracing::info!("Collector stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gpuwatch_collector=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
