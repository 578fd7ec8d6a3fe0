//! ddbackup - Main Entry Point
//! HTTP shell + cron-driven block-device backups of registered hosts

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{DaemonConfig, LogFormat};
use ddbackup_api_http::{AppState, HttpServer};
use ddbackup_core::application::{
    tally_outcomes, BackupExecutor, DeviceRegistry, ScheduleService, ScheduleStore,
    SchedulerController,
};
use ddbackup_core::port::id_provider::UuidProvider;
use ddbackup_core::VERSION;
use ddbackup_core::port::time_provider::SystemTimeProvider;
use ddbackup_infra_sqlite::{
    create_pool, run_migrations, SqliteDeviceRepository, SqliteScheduleRepository,
};
use ddbackup_infra_system::ShellExecutor;

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("ddbackup=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        // Never resolve: the server keeps running rather than exiting at once
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Exiting gracefully...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("ddbackup v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    let db_path = config.db_path.to_string_lossy().into_owned();
    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let registry = Arc::new(DeviceRegistry::new(Arc::new(SqliteDeviceRepository::new(
        pool.clone(),
    ))));
    let store = Arc::new(ScheduleStore::new(Arc::new(SqliteScheduleRepository::new(
        pool.clone(),
    ))));

    let remote = Arc::new(ShellExecutor::new(
        time_provider.clone(),
        config.env_allowlist.clone(),
    ));
    let (outcome_tx, outcome_rx) = unbounded_channel();
    let executor = Arc::new(
        BackupExecutor::new(
            remote,
            time_provider.clone(),
            id_provider,
            config.backup_command.clone(),
        )
        .with_outcome_sink(outcome_tx),
    );
    tokio::spawn(tally_outcomes(outcome_rx));

    let controller = Arc::new(SchedulerController::new(
        registry.clone(),
        executor,
        time_provider,
    ));
    let schedules = Arc::new(ScheduleService::new(store, controller.clone()));

    // 5. Report what will be backed up
    match registry.list_devices().await {
        Ok(devices) if devices.is_empty() => warn!("No devices registered yet"),
        Ok(devices) => {
            for device in &devices {
                info!(
                    id = device.id,
                    user = %device.user,
                    ip = %device.ip,
                    output_file = %device.output_file,
                    "Registered device"
                );
            }
        }
        Err(e) => error!(error = %e, "Failed to list devices"),
    }

    // 6. Start HTTP server
    let server = HttpServer::bind(
        config.http.clone(),
        AppState::new(registry, schedules.clone()),
    )
    .await
    .with_context(|| format!("Failed to bind {}:{}", config.http.host, config.http.port))?;

    // 7. Arm the backup trigger with the stored schedule
    match schedules.arm_stored().await {
        Ok(expr) => info!(schedule = %expr, "Backup trigger armed"),
        // Stay unarmed until a valid schedule is submitted through the form
        Err(e) => error!(error = %e, "Stored schedule not armed"),
    }

    info!("System ready. Press Ctrl+C to shutdown");

    // 8. Serve until Ctrl+C
    server
        .serve(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // 9. Graceful shutdown (running backups are not awaited)
    controller.disarm();
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
