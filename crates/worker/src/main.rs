//! Queue worker for asynchronous message ingestion.
//!
//! Polls the `parse_jobs` table and runs the ingest pipeline for each
//! claimed job. Multiple workers may run side by side; the claim query
//! hands each job to exactly one of them per delivery.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundmate_worker=debug,fundmate_ingest=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = fundmate_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    fundmate_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    fundmate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let classifier = fundmate_classifier::from_env().expect("Invalid classifier configuration");
    tracing::info!(model = classifier.model_name(), "Classifier configured");

    let cancel = tokio_util::sync::CancellationToken::new();
    let poller_cancel = cancel.clone();
    let poller = tokio::spawn(fundmate_ingest::poll::run(pool, classifier, poller_cancel));

    shutdown_signal().await;

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), poller).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
