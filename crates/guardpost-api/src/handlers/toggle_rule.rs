use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_common::{rules_checksum, ConsoleCommand};
use guardpost_core::{toggle_rule, Notification, ToggleAction};
use guardpost_db::{Model as _, RulesRevision, RulesStore};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidatableRequest;
use crate::handlers::ValidatedJson;
use crate::ApiState;

/// Longest hostname the DNS allows
const MAX_DOMAIN_LEN: usize = 253;

#[derive(Debug, Deserialize)]
pub struct RawToggleRequest {
    pub action: ToggleAction,
    pub domain: String,
}

pub struct ToggleRequest {
    pub action: ToggleAction,
    pub domain: String,
}

impl ValidatableRequest for ToggleRequest {
    type Raw = RawToggleRequest;

    fn validate(raw: Self::Raw) -> anyhow::Result<Self> {
        let domain = raw.domain.trim().to_ascii_lowercase();

        if domain.is_empty() {
            anyhow::bail!("Missing 'domain'");
        }
        if domain.len() > MAX_DOMAIN_LEN {
            anyhow::bail!("'domain' is too long");
        }

        // Reject anything that could smuggle extra lines or pattern syntax
        // into the rule list
        let hostname = Regex::new(r"^[a-z0-9]([a-z0-9._-]*[a-z0-9])?$").context("bug: invalid hostname pattern")?;
        if !hostname.is_match(&domain) {
            anyhow::bail!("'domain' is not a valid hostname");
        }

        Ok(ToggleRequest {
            action: raw.action,
            domain,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub rules: String,
    pub notification: Notification,
}

pub async fn handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    ValidatedJson(request): ValidatedJson<ToggleRequest>,
) -> Response {
    let response = match process_request(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Error while toggling a rule: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    Json(response).into_response()
}

async fn process_request<S: RulesStore>(state: &ApiState<S>, request: ToggleRequest) -> anyhow::Result<ToggleResponse> {
    let rules = state.store.load().await.context("failed to load the user rules")?;

    let outcome = toggle_rule(&rules, request.action, &request.domain);

    if outcome.rules != rules {
        state
            .store
            .save(&outcome.rules)
            .await
            .context("failed to persist the user rules")?;

        let revision = RulesRevision::new(outcome.rules.clone(), rules_checksum(&outcome.rules))?;
        let mut connection = state.db.get_connection().await?;
        revision.insert_into(&mut connection).await?;
    }

    // The filtering state is refreshed even when the text did not change
    let _ = state.command_tx.send(ConsoleCommand::RefreshFiltering).await;

    tracing::info!("{}", outcome.notification);

    Ok(ToggleResponse {
        rules: outcome.rules,
        notification: outcome.notification,
    })
}
