use async_trait::async_trait;
use clickhouse::Client;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use super::errors::QueryExecutionError;
use super::parameter_substitution::substitute_parameters;
use super::{Cell, QueryExecutor, QueryParams, QueryResult};
use crate::config::PathSqlConfig;
use crate::query_analyzer::strip_comments;

/// Header line with column names, then one JSON array per row
const RESPONSE_FORMAT: &str = "JSONCompactEachRowWithNames";

pub fn build_client(config: &PathSqlConfig) -> Client {
    log::info!(
        "ClickHouse client: url={}, database={}",
        config.clickhouse_url,
        config.clickhouse_database
    );
    Client::default()
        .with_url(config.clickhouse_url.as_str())
        .with_user(config.clickhouse_user.as_str())
        .with_password(config.clickhouse_password.as_str())
        .with_database(config.clickhouse_database.as_str())
        .with_option("join_use_nulls", "1") // NULL, not defaults, for unmatched LEFT JOIN columns
        .with_option("output_format_json_quote_64bit_integers", "0")
}

/// Comments and trailing semicolons removed, parameters bound.
///
/// The response format is appended to the query text by the client, so a
/// trailing `-- PATH` comment would otherwise swallow it. The client also reads
/// `?` as a bind placeholder; every literal `?` is sent as `??`.
pub(crate) fn prepare_sql(sql: &str, params: &QueryParams) -> Result<String, QueryExecutionError> {
    let stripped = strip_comments(sql);
    let trimmed = stripped.trim().trim_end_matches(';').trim_end();
    let bound = substitute_parameters(trimmed, params)?;
    Ok(bound.replace('?', "??"))
}

#[derive(Clone)]
pub struct ClickHouseExecutor {
    client: Client,
}

impl ClickHouseExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &PathSqlConfig) -> Self {
        Self::new(build_client(config))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl QueryExecutor for ClickHouseExecutor {
    async fn execute(
        &self,
        sql: &str,
        params: &QueryParams,
    ) -> Result<QueryResult, QueryExecutionError> {
        let final_sql = prepare_sql(sql, params)?;
        log::debug!("Executing SQL:\n{}", final_sql);

        let mut lines = self
            .client
            .query(&final_sql)
            .fetch_bytes(RESPONSE_FORMAT)
            .map_err(|e| {
                log::error!(
                    "ClickHouse query failed. SQL was:\n{}\nError: {}",
                    final_sql,
                    e
                );
                e
            })?
            .lines();

        let mut result = QueryResult::default();
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            if line_no == 1 {
                result.columns = parse_line(&line, line_no)?;
                continue;
            }
            let row: Vec<Value> = parse_line(&line, line_no)?;
            result.rows.push(row.into_iter().map(Cell::Value).collect());
        }

        log::debug!(
            "Fetched {} rows with columns {:?}",
            result.rows.len(),
            result.columns
        );
        Ok(result)
    }
}

fn parse_line<T: serde::de::DeserializeOwned>(
    line: &str,
    line_no: usize,
) -> Result<T, QueryExecutionError> {
    serde_json::from_str(line).map_err(|source| QueryExecutionError::MalformedResponse {
        line: line_no,
        source,
    })
}
