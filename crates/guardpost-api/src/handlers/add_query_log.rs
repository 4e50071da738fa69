use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use guardpost_db::{Model as _, QueryLog, RulesStore};
use serde::Deserialize;

use super::ValidatableRequest;
use crate::handlers::ValidatedJson;
use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct RawQueryLogRequest {
    pub domain: String,
    pub qtype: u16,
    pub client: Option<String>,
    pub elapsed_ms: u32,
    pub filtered: bool,
    pub rule: Option<String>,
}

pub struct AddQueryLogRequest {
    pub domain: String,
    pub qtype: u16,
    pub client: Option<String>,
    pub elapsed_ms: u32,
    pub filtered: bool,
    pub rule: Option<String>,
}

impl ValidatableRequest for AddQueryLogRequest {
    type Raw = RawQueryLogRequest;

    fn validate(raw: Self::Raw) -> anyhow::Result<Self> {
        if raw.domain.trim().is_empty() {
            anyhow::bail!("Missing 'domain'");
        }

        if let Some(client) = raw.client.as_ref() {
            if client.parse::<IpAddr>().is_err() {
                anyhow::bail!("'client' is not a valid IP address");
            }
        }

        Ok(AddQueryLogRequest {
            domain: raw.domain,
            qtype: raw.qtype,
            client: raw.client,
            elapsed_ms: raw.elapsed_ms,
            filtered: raw.filtered,
            rule: raw.rule,
        })
    }
}

/// Ingest endpoint for the filtering engine: one resolved query per call.
pub async fn handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    ValidatedJson(request): ValidatedJson<AddQueryLogRequest>,
) -> Response {
    if !state.querylog_config.read().await.enabled {
        // Logging is switched off: accept and drop
        return StatusCode::OK.into_response();
    }

    if let Err(e) = process_request(&state, request).await {
        tracing::debug!("Error while storing a query log entry: {:#}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    StatusCode::OK.into_response()
}

async fn process_request<S: RulesStore>(state: &ApiState<S>, request: AddQueryLogRequest) -> anyhow::Result<()> {
    let entry = QueryLog::new(
        request.domain,
        request.qtype,
        request.client,
        request.elapsed_ms,
        request.filtered,
        request.rule,
    )?;

    let mut connection = state.db.get_connection().await?;
    entry.insert_into(&mut connection).await?;

    Ok(())
}
