use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse as _, Response};
use axum::Json;
use guardpost_db::RulesStore;
use serde::Deserialize;

use super::ValidatableRequest;
use crate::handlers::ValidatedJson;
use crate::ApiState;

const MAX_RETENTION_HOURS: u32 = 24 * 365;

pub async fn get_handler<S: RulesStore>(State(state): State<Arc<ApiState<S>>>) -> Response {
    let config = state.querylog_config.read().await.clone();
    Json(config).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RawLogsConfigRequest {
    pub enabled: Option<bool>,
    pub retention_hours: Option<u32>,
    pub anonymize_clients: Option<bool>,
}

/// Partial update: absent fields keep their current value.
pub struct UpdateLogsConfigRequest {
    pub enabled: Option<bool>,
    pub retention_hours: Option<u32>,
    pub anonymize_clients: Option<bool>,
}

impl ValidatableRequest for UpdateLogsConfigRequest {
    type Raw = RawLogsConfigRequest;

    fn validate(raw: Self::Raw) -> anyhow::Result<Self> {
        if let Some(retention_hours) = raw.retention_hours {
            if retention_hours == 0 || retention_hours > MAX_RETENTION_HOURS {
                anyhow::bail!("'retention_hours' must be between 1 and {}", MAX_RETENTION_HOURS);
            }
        }

        Ok(UpdateLogsConfigRequest {
            enabled: raw.enabled,
            retention_hours: raw.retention_hours,
            anonymize_clients: raw.anonymize_clients,
        })
    }
}

pub async fn update_handler<S: RulesStore>(
    State(state): State<Arc<ApiState<S>>>,
    ValidatedJson(request): ValidatedJson<UpdateLogsConfigRequest>,
) -> Response {
    let updated = {
        let mut config = state.querylog_config.write().await;
        if let Some(enabled) = request.enabled {
            config.enabled = enabled;
        }
        if let Some(retention_hours) = request.retention_hours {
            config.retention_hours = retention_hours;
        }
        if let Some(anonymize_clients) = request.anonymize_clients {
            config.anonymize_clients = anonymize_clients;
        }
        config.clone()
    };

    tracing::info!(
        "Updated the query log config: enabled={}, retention_hours={}, anonymize_clients={}",
        updated.enabled,
        updated.retention_hours,
        updated.anonymize_clients
    );

    Json(updated).into_response()
}
