//! The pipeline driven by `MetadataReader` instead of static metadata

use pathsql::executor::QueryParams;
use pathsql::schema_metadata::MetadataReader;
use pathsql::PathSqlClient;
use serde_json::json;
use std::sync::Arc;

use super::common::CannedExecutor;

const FK_FRAGMENT: &str = "REFERENCED_TABLE_NAME IS NOT NULL";

const POSTS_WITH_COMMENTS: &str =
    "SELECT p.id, c.id FROM posts p JOIN comments c ON c.post_id = p.id -- PATH p $.posts";

fn blog_executor() -> Arc<CannedExecutor> {
    Arc::new(
        CannedExecutor::new()
            .answer(
                FK_FRAGMENT,
                &["TABLE_NAME", "COLUMN_NAME", "REFERENCED_TABLE_NAME", "REFERENCED_COLUMN_NAME"],
                vec![vec![json!("comments"), json!("post_id"), json!("posts"), json!("id")]],
            )
            .answer(
                "FROM posts p",
                &["id", "id"],
                vec![vec![json!(1), json!(7)], vec![json!(1), json!(8)]],
            ),
    )
}

fn mysql_client(executor: &Arc<CannedExecutor>) -> PathSqlClient {
    let metadata = Arc::new(MetadataReader::new(executor.clone(), "mysql"));
    PathSqlClient::new(executor.clone(), metadata)
}

#[tokio::test]
async fn test_introspected_foreign_key_makes_join_an_array() {
    let executor = blog_executor();
    let tree = mysql_client(&executor)
        .path_query(POSTS_WITH_COMMENTS, &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{"id": 1, "c": [{"id": 7}, {"id": 8}]}]})
    );
}

#[tokio::test]
async fn test_foreign_keys_are_fetched_once_until_invalidated() {
    let executor = blog_executor();
    let client = mysql_client(&executor);

    for _ in 0..2 {
        client
            .path_query(POSTS_WITH_COMMENTS, &QueryParams::new())
            .await
            .unwrap();
    }
    assert_eq!(executor.calls_matching(FK_FRAGMENT), 1);

    client.invalidate_metadata_cache().await;
    client
        .path_query(POSTS_WITH_COMMENTS, &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(executor.calls_matching(FK_FRAGMENT), 2);
    assert_eq!(executor.total_calls(), 5);
}

#[tokio::test]
async fn test_clickhouse_metadata_reads_joins_by_kind() {
    let executor = blog_executor();
    let metadata = Arc::new(MetadataReader::new(executor.clone(), "ClickHouse"));
    let client = PathSqlClient::new(executor.clone(), metadata);

    // No foreign keys on ClickHouse: an INNER join is an object, and an
    // object child is part of its parent's identity
    let tree = client
        .path_query(POSTS_WITH_COMMENTS, &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{"id": 1, "c": {"id": 7}}, {"id": 1, "c": {"id": 8}}]})
    );
    assert_eq!(executor.calls_matching(FK_FRAGMENT), 0);
}

#[tokio::test]
async fn test_unsupported_driver_falls_back_to_flat_paths() {
    let executor = Arc::new(CannedExecutor::new().answer(
        "FROM posts",
        &["id", "title"],
        vec![vec![json!(1), json!("A")]],
    ));
    let metadata = Arc::new(MetadataReader::new(executor.clone(), "sqlite"));
    let client = PathSqlClient::new(executor.clone(), metadata);

    let tree = client
        .path_query(
            "SELECT p.id, c.title FROM posts p JOIN comments c ON c.post_id = p.id",
            &QueryParams::new(),
        )
        .await
        .unwrap();
    assert_eq!(tree, json!([{"id": 1, "title": "A"}]));
    assert_eq!(executor.total_calls(), 1);
}

#[tokio::test]
async fn test_missing_column_lists_attribute_to_first_table() {
    // Only foreign keys and the query itself are answered; column lookups fail
    let executor = Arc::new(
        CannedExecutor::new()
            .answer(
                FK_FRAGMENT,
                &["TABLE_NAME", "COLUMN_NAME", "REFERENCED_TABLE_NAME", "REFERENCED_COLUMN_NAME"],
                vec![vec![json!("comments"), json!("post_id"), json!("posts"), json!("id")]],
            )
            .answer(
                "FROM posts p",
                &["id", "body"],
                vec![vec![json!(1), json!("x")]],
            ),
    );
    let client = mysql_client(&executor);

    let tree = client
        .path_query(
            "SELECT p.id, body FROM posts p JOIN comments c ON c.post_id = p.id -- PATH p $.posts",
            &QueryParams::new(),
        )
        .await
        .unwrap();
    assert_eq!(tree, json!({"posts": [{"id": 1, "body": "x"}]}));
}
