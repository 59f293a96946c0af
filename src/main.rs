//! Harborlight Worker - Backend service for the staff portal
//!
//! This worker connects to NATS and handles messages from the portal
//! frontend. It also exposes operator subcommands for migrations and
//! file-based roster imports.

mod auth;
mod cli;
mod config;
mod db;
mod defaults;
mod handlers;
mod services;
mod types;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::PgPool;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,harborlight_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())  // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    let args = Cli::parse();

    info!("Starting Harborlight Worker...");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    // Run migrations
    db::run_migrations(&pool).await?;

    match args.command {
        Some(Command::Migrate) => {
            info!("Migrations applied, exiting");
            return Ok(());
        }
        Some(Command::ImportRoster { file, default_role }) => {
            return import_roster_file(pool, &file, default_role.as_deref()).await;
        }
        Some(Command::Serve) | None => {}
    }

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, pool, &config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Operator path: reconcile a roster export file into the registry and print
/// the report.
async fn import_roster_file(pool: PgPool, file: &Path, default_role: Option<&str>) -> Result<()> {
    use crate::services::registry::PgPersonRegistry;
    use crate::services::roster::RosterImporter;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read roster file {}", file.display()))?;

    let registry = PgPersonRegistry::new(pool);
    let importer = RosterImporter::new(&registry);
    let report = importer
        .import(&content, default_role.unwrap_or(defaults::DEFAULT_IMPORT_ROLE))
        .await;

    println!(
        "Import {}: {} created, {} updated, {} skipped",
        if report.success { "finished" } else { "failed" },
        report.created,
        report.updated,
        report.skipped
    );
    for error in &report.errors {
        println!("  {}", error);
    }
    for uncertain in &report.uncertain_fields {
        println!("  review: {} / {}", uncertain.email, uncertain.field);
    }

    if report.success {
        Ok(())
    } else {
        anyhow::bail!("roster import failed")
    }
}
