use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_common::{rules_checksum, ConsoleCommand};
use guardpost_db::{Model as _, RulesRevision, RulesStore};
use serde::Deserialize;

use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct SetRulesRequest {
    pub rules: String,
}

/// Replaces the whole user rules text, as saved from the raw rule editor.
pub async fn handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(request): Json<SetRulesRequest>,
) -> Response {
    if let Err(e) = process_request(&state, request).await {
        tracing::debug!("Error while setting the user rules: {:#}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    StatusCode::OK.into_response()
}

async fn process_request<S: RulesStore>(state: &ApiState<S>, request: SetRulesRequest) -> anyhow::Result<()> {
    let current = state.store.load().await.context("failed to load the user rules")?;

    if current != request.rules {
        state
            .store
            .save(&request.rules)
            .await
            .context("failed to persist the user rules")?;

        let revision = RulesRevision::new(request.rules.clone(), rules_checksum(&request.rules))?;
        let mut connection = state.db.get_connection().await?;
        revision.insert_into(&mut connection).await?;

        tracing::info!("Replaced the user rules ({} bytes)", request.rules.len());
    }

    let _ = state.command_tx.send(ConsoleCommand::RefreshFiltering).await;

    Ok(())
}
