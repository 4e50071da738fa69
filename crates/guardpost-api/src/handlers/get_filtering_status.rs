use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_db::RulesStore;
use serde::Serialize;

use crate::ApiState;

#[derive(Debug, Serialize)]
struct FilteringStatus {
    enabled: bool,
    rules_count: usize,
    user_rules: String,
}

pub async fn handler<S: RulesStore>(State(state): State<Arc<ApiState<S>>>) -> Response {
    let user_rules = match state.store.load().await.context("failed to load the user rules") {
        Ok(rules) => rules,
        Err(e) => {
            tracing::debug!("Error while getting the filtering status: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let filtering = state.filtering.read().await;

    Json(FilteringStatus {
        enabled: filtering.enabled,
        rules_count: filtering.ruleset.rule_count(),
        user_rules,
    })
    .into_response()
}
