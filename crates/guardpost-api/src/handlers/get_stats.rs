use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_db::{RulesStore, SqliteDb};
use serde::Serialize;

use crate::util::{count_distinct_clients_query, count_filtered_queries_query, count_queries_query};
use crate::ApiState;

#[derive(Debug, Serialize)]
struct Stats {
    total_queries: u32,
    filtered_queries: u32,
    distinct_clients: u32,
}

pub async fn handler<S: RulesStore>(State(state): State<Arc<ApiState<S>>>) -> Response {
    let stats = match get_stats_handler(&state.db).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::debug!("Error while getting stats: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    Json(stats).into_response()
}

async fn get_stats_handler(db: &SqliteDb) -> anyhow::Result<Stats> {
    let mut connection = db.get_connection().await?;

    let mut query = count_queries_query();
    let total_queries = query
        .build_query_scalar::<u32>()
        .fetch_optional(&mut *connection)
        .await
        .context("failed to get the total query count from DB")?
        .context("bug: total query count is missing")?;

    let mut query = count_filtered_queries_query();
    let filtered_queries = query
        .build_query_scalar::<u32>()
        .fetch_optional(&mut *connection)
        .await
        .context("failed to get the filtered query count from DB")?
        .context("bug: filtered query count is missing")?;

    let mut query = count_distinct_clients_query();
    let distinct_clients = query
        .build_query_scalar::<u32>()
        .fetch_optional(&mut *connection)
        .await
        .context("failed to get the client count from DB")?
        .context("bug: client count is missing")?;

    Ok(Stats {
        total_queries,
        filtered_queries,
        distinct_clients,
    })
}
