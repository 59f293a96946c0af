//! Roster import message handlers
//!
//! The import subject is gated on the `people.import` permission; preview
//! only needs a valid session token since it writes nothing.

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::defaults::DEFAULT_IMPORT_ROLE;
use crate::services::registry::PersonRegistry;
use crate::services::roster::{self, RosterImporter};
use crate::types::{
    ErrorResponse, Request, RosterImportRequest, RosterPreviewRequest, SuccessResponse,
};

/// Subject portal views listen on to drop cached people lists
const PEOPLE_UPDATED_SUBJECT: &str = "harborlight.events.people.updated";

/// Handle people.roster.import messages
pub async fn handle_import(
    client: Client,
    mut subscriber: Subscriber,
    registry: Arc<dyn PersonRegistry>,
    jwt_secret: String,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received people.roster.import message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<RosterImportRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse roster import request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        // Bulk imports are gated before any row is touched
        let auth_info = match auth::extract_auth(&request, &jwt_secret) {
            Ok(info) => info,
            Err(e) => {
                let error = ErrorResponse::new(request.id, "UNAUTHORIZED", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };
        if !auth_info.can("people.import") {
            let error = ErrorResponse::new(
                request.id,
                "FORBIDDEN",
                "people.import permission required",
            );
            let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            continue;
        }

        let default_role = request
            .payload
            .default_role
            .as_deref()
            .unwrap_or(DEFAULT_IMPORT_ROLE);

        let importer = RosterImporter::new(registry.as_ref());
        let report = importer.import(&request.payload.content, default_role).await;

        info!(
            "Roster import by {} ({}): {} created, {} updated, {} skipped, {} errors",
            auth_info.user_id,
            auth_info.role,
            report.created,
            report.updated,
            report.skipped,
            report.errors.len()
        );

        // Portal views cache the people list; tell them it changed
        if report.created + report.updated > 0 {
            if let Err(e) = client
                .publish(PEOPLE_UPDATED_SUBJECT, b"{}".to_vec().into())
                .await
            {
                warn!("Failed to publish people.updated event: {}", e);
            }
        }

        let response = SuccessResponse::new(request.id, report);
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}

/// Handle people.roster.preview messages
pub async fn handle_preview(
    client: Client,
    mut subscriber: Subscriber,
    jwt_secret: String,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received people.roster.preview message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<RosterPreviewRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse roster preview request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        if let Err(e) = auth::extract_auth(&request, &jwt_secret) {
            let error = ErrorResponse::new(request.id, "UNAUTHORIZED", e.to_string());
            let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            continue;
        }

        let result = roster::preview(&request.payload.content);
        debug!("Previewed roster with {} data rows", result.row_count);

        let response = SuccessResponse::new(request.id, result);
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}
