use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use guardpost_db::RulesStore;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    add_query_log, check_host, clear_query_logs, get_filtering_status, get_logs_config, get_query_logs, get_stats,
    health_check, set_rules, toggle_rule, update_logs_config,
};
use crate::ApiState;

pub fn get_router<S: RulesStore>(state: ApiState<S>) -> Router {
    let state = Arc::new(state);
    Router::new()
        .route("/", get(health_check))
        .route("/filtering/status", get(get_filtering_status::<S>))
        .route("/filtering/rules", post(set_rules::<S>))
        .route("/filtering/toggle", post(toggle_rule::<S>))
        .route("/filtering/check", get(check_host::<S>))
        .route("/logs", get(get_query_logs::<S>).post(add_query_log::<S>))
        .route("/logs/clear", post(clear_query_logs::<S>))
        .route("/logs/config", get(get_logs_config::<S>).put(update_logs_config::<S>))
        .route("/stats", get(get_stats::<S>))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([CONTENT_TYPE])
                .allow_origin(Any),
        )
        .with_state(state)
}
