use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gpuwatch_engine::{retention, ActionDispatcher, EngineConfig, PgGateway, StreamConsumer};
use gpuwatch_events::{LogNotifier, Notifier, PgTopic, WebhookNotifier};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Alert engine failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // --- Configuration ---
    let config = EngineConfig::from_env().context("Invalid engine configuration")?;
    tracing::info!(
        topic = %config.topic,
        consumer_group = %config.consumer_group,
        start_offset = ?config.start_offset,
        "Loaded engine configuration",
    );

    // --- Database ---
    let pool = gpuwatch_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    gpuwatch_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    gpuwatch_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Topic ---
    let topic = PgTopic::new(pool.clone(), &config.topic);
    let consumer = topic
        .consumer(&config.consumer_group, config.start_offset, config.poll_interval)
        .await
        .context("Failed to create topic consumer")?;

    // --- Pipeline ---
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Notifications go to webhook");
            Arc::new(WebhookNotifier::new(url.as_str()).context("Failed to build webhook client")?)
        }
        None => {
            tracing::info!("No webhook configured, notifications are logged only");
            Arc::new(LogNotifier)
        }
    };
    let gateway = Arc::new(PgGateway::new(pool.clone()));
    let dispatcher = ActionDispatcher::new(gateway.clone(), notifier, &config.notify_channel);
    let stream = StreamConsumer::new(consumer, gateway, dispatcher);

    // --- Shutdown ---
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    // --- Metric retention ---
    let retention_handle = (config.metrics_retention_hours > 0).then(|| {
        tokio::spawn(retention::run(
            pool.clone(),
            config.metrics_retention_hours,
            cancel.clone(),
        ))
    });

    stream.run(cancel.clone()).await;

    // The consumer can also stop on its own, so make sure the job stops too.
    cancel.cancel();
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    tracing::info!("Alert engine stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gpuwatch_engine=debug,gpuwatch_events=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), finishing in-flight event");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, finishing in-flight event");
        }
    }
}
