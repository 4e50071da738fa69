use sqlx::{QueryBuilder, Sqlite};

use super::handlers::Sort;
use crate::handlers::QueryLogsFilter;

/// Page size applied when the caller does not ask for one
const DEFAULT_LOGS_LIMIT: u32 = 100;

pub fn build_select_logs_query_with_filters(filter: &QueryLogsFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = sqlx::QueryBuilder::new("SELECT * FROM query_log WHERE 1=1");

    if let Some(from_timestamp) = filter.from_timestamp {
        query.push(" AND timestamp >= ").push_bind(from_timestamp);
    }

    if let Some(domain) = filter.domain.as_ref() {
        query
            .push(" AND domain LIKE ")
            .push_bind(format!("%{}%", escape_like(domain)))
            .push(" ESCAPE '\\'");
    }

    if let Some(client) = filter.client.as_ref() {
        query.push(" AND client = ").push_bind(client.clone());
    }

    if filter.filtered_only {
        query.push(" AND filtered = 1");
    }

    query.push(" ORDER BY id");
    if let Sort::Desc = filter.sort {
        query.push(" DESC");
    }

    query
        .push(" LIMIT ")
        .push_bind(filter.limit.unwrap_or(DEFAULT_LOGS_LIMIT));
    if let Some(offset) = filter.offset {
        query.push(" OFFSET ").push_bind(offset);
    }

    query
}

pub fn count_queries_query() -> QueryBuilder<'static, Sqlite> {
    sqlx::QueryBuilder::new("SELECT COUNT(id) as 'count' FROM query_log")
}

pub fn count_filtered_queries_query() -> QueryBuilder<'static, Sqlite> {
    sqlx::QueryBuilder::new("SELECT COUNT(id) as 'count' FROM query_log WHERE filtered = 1")
}

pub fn count_distinct_clients_query() -> QueryBuilder<'static, Sqlite> {
    sqlx::QueryBuilder::new("SELECT COUNT(DISTINCT client) as 'count' FROM query_log WHERE client IS NOT NULL")
}

/// Escapes LIKE wildcards so user input only ever matches literally
fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("a%b_c\\d"), "a\\%b\\_c\\\\d");
        assert_eq!(escape_like("plain.example"), "plain.example");
    }

    #[test]
    fn applies_every_requested_filter() {
        let filter = QueryLogsFilter {
            limit: Some(25),
            offset: Some(50),
            from_timestamp: Some(1_700_000_000),
            domain: Some("ads".to_string()),
            client: Some("192.168.1.2".to_string()),
            filtered_only: true,
            sort: Sort::Desc,
        };

        let mut query = build_select_logs_query_with_filters(&filter);
        let sql = query.build().sql().to_string();

        assert!(sql.contains("timestamp >="));
        assert!(sql.contains("domain LIKE"));
        assert!(sql.contains("client ="));
        assert!(sql.contains("filtered = 1"));
        assert!(sql.contains("ORDER BY id DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn defaults_to_ascending_order_without_explicit_pagination() {
        let filter = QueryLogsFilter {
            limit: None,
            offset: None,
            from_timestamp: None,
            domain: None,
            client: None,
            filtered_only: false,
            sort: Sort::Asc,
        };

        let mut query = build_select_logs_query_with_filters(&filter);
        let sql = query.build().sql().to_string();

        assert!(!sql.contains("DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }
}
