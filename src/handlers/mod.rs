//! NATS message handlers

pub mod ping;
pub mod roster;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::registry::{create_registry, PersonRegistry};

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    // Create shared registry
    let registry: Arc<dyn PersonRegistry> = Arc::from(create_registry(pool.clone()));
    info!("Person registry initialized: {}", registry.name());

    // Subscribe to all subjects
    let ping_sub = client.subscribe("harborlight.ping").await?;
    let roster_import_sub = client.subscribe("harborlight.people.roster.import").await?;
    let roster_preview_sub = client.subscribe("harborlight.people.roster.preview").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let client_ping = client.clone();
    let client_roster_import = client.clone();
    let client_roster_preview = client.clone();

    let registry_roster_import = Arc::clone(&registry);

    let secret_roster_import = config.jwt_secret.clone();
    let secret_roster_preview = config.jwt_secret.clone();

    // Spawn handlers
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let roster_import_handle = tokio::spawn(async move {
        roster::handle_import(
            client_roster_import,
            roster_import_sub,
            registry_roster_import,
            secret_roster_import,
        )
        .await
    });

    let roster_preview_handle = tokio::spawn(async move {
        roster::handle_preview(
            client_roster_preview,
            roster_preview_sub,
            secret_roster_preview,
        )
        .await
    });

    info!("All handlers started");

    // Handlers run until the process stops; any one finishing is a fault
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = roster_import_handle => {
            error!("Roster import handler finished: {:?}", result);
        }
        result = roster_preview_handle => {
            error!("Roster preview handler finished: {:?}", result);
        }
    }

    Ok(())
}
