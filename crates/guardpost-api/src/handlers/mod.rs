mod add_query_log;
mod check_host;
mod clear_query_logs;
mod get_filtering_status;
mod get_query_logs;
mod get_stats;
mod logs_config;
mod set_rules;
mod toggle_rule;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
pub use add_query_log::handler as add_query_log;
pub use check_host::handler as check_host;
pub use clear_query_logs::handler as clear_query_logs;
pub use get_filtering_status::handler as get_filtering_status;
pub use get_query_logs::{handler as get_query_logs, QueryLogsFilter};
pub use get_stats::handler as get_stats;
pub use logs_config::{get_handler as get_logs_config, update_handler as update_logs_config};
use serde::Deserialize;
pub use set_rules::handler as set_rules;
pub use toggle_rule::handler as toggle_rule;

pub trait ValidatableRequest: Sized {
    type Raw;

    fn validate(raw: Self::Raw) -> anyhow::Result<Self>;
}

pub enum ValidationRejection {
    JsonError(String),
    ValidationError(String),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        match self {
            ValidationRejection::JsonError(mut error) => {
                error.insert_str(0, "Error while parsing JSON: ");
                (StatusCode::BAD_REQUEST, error).into_response()
            }
            ValidationRejection::ValidationError(mut error) => {
                error.insert_str(0, "Error while validating the input data: ");
                (StatusCode::BAD_REQUEST, error).into_response()
            }
        }
    }
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: ValidatableRequest,
    Json<T::Raw>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<T::Raw>::from_request(req, state)
            .await
            .map_err(|e| (ValidationRejection::JsonError(e.to_string())))?;
        Ok(ValidatedJson(
            T::validate(raw).map_err(|e| ValidationRejection::ValidationError(e.to_string()))?,
        ))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Asc,
    #[default]
    Desc,
}

pub async fn health_check() -> &'static str {
    "alive"
}
