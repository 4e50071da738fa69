use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use futures::StreamExt as _;
use guardpost_db::{QueryLog, RulesStore};
use serde::Deserialize;

use super::Sort;
use crate::util::build_select_logs_query_with_filters;
use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct QueryLogsFilter {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub from_timestamp: Option<u32>,
    /// Substring match on the domain column
    pub domain: Option<String>,
    /// Exact match on the client column
    pub client: Option<String>,
    #[serde(default)]
    pub filtered_only: bool,
    #[serde(default)]
    pub sort: Sort,
}

pub async fn handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(filter): Query<QueryLogsFilter>,
) -> Response {
    let anonymize = state.querylog_config.read().await.anonymize_clients;

    let logs = match get_query_logs_handler(&state, &filter, anonymize).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::debug!(filter = ?filter, "Error while getting query logs: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    Json(logs).into_response()
}

async fn get_query_logs_handler<S: RulesStore>(
    state: &ApiState<S>,
    filter: &QueryLogsFilter,
    anonymize: bool,
) -> anyhow::Result<Vec<QueryLog>> {
    let mut query = build_select_logs_query_with_filters(filter);

    let mut connection = state.db.get_connection().await?;

    let mut rows = query.build_query_as::<QueryLog>().fetch(&mut *connection);
    let mut logs = Vec::new();
    while let Some(log) = rows.next().await {
        let mut log = log.context("failed to get query logs from DB")?;
        if anonymize {
            log.client = log.client.map(|client| anonymize_client(&client));
        }
        logs.push(log);
    }

    Ok(logs)
}

/// Zeroes the host part of a client address: /24 for IPv4, /64 for IPv6.
/// Anything that does not parse as an address is passed through untouched.
fn anonymize_client(client: &str) -> String {
    match client.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => {
            let mut octets = addr.octets();
            octets[3] = 0;
            Ipv4Addr::from(octets).to_string()
        }
        Ok(IpAddr::V6(addr)) => {
            let mut segments = addr.segments();
            segments[4..].fill(0);
            Ipv6Addr::from(segments).to_string()
        }
        Err(_) => client.to_string(),
    }
}
