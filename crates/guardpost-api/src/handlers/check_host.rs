use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_db::RulesStore;
use serde::{Deserialize, Serialize};

use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct CheckHostParams {
    pub domain: String,
}

#[derive(Debug, Serialize)]
struct CheckHostResponse {
    filtered: bool,
    rule: Option<String>,
}

/// Tells the log view whether a domain is currently filtered and by which
/// directive, so each row can offer the right block/unblock affordance.
pub async fn handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<CheckHostParams>,
) -> Response {
    let filtering = state.filtering.read().await;

    if !filtering.enabled {
        return Json(CheckHostResponse {
            filtered: false,
            rule: None,
        })
        .into_response();
    }

    let response = match filtering.ruleset.match_domain(&params.domain) {
        Some(directive) => CheckHostResponse {
            filtered: !directive.allow,
            rule: Some(directive.to_string()),
        },
        None => CheckHostResponse {
            filtered: false,
            rule: None,
        },
    };

    Json(response).into_response()
}
