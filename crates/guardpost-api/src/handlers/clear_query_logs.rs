use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use guardpost_db::RulesStore;

use crate::ApiState;

pub async fn handler<S: RulesStore>(State(state): State<Arc<ApiState<S>>>) -> Response {
    if let Err(e) = clear_query_logs_handler(&state).await {
        tracing::debug!("Error while clearing the query log: {:#}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    StatusCode::OK.into_response()
}

async fn clear_query_logs_handler<S: RulesStore>(state: &ApiState<S>) -> anyhow::Result<()> {
    let mut connection = state.db.get_connection().await?;

    let cleared = sqlx::query("DELETE FROM query_log")
        .execute(&mut *connection)
        .await
        .context("error while clearing the query log")?
        .rows_affected();

    tracing::info!("Cleared the query log ({} entries)", cleared);

    Ok(())
}
