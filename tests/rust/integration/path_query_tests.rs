//! End-to-end reshaping against static blog metadata

use pathsql::executor::QueryParams;
use pathsql::result_tree::{ConflictKind, TreeError};
use pathsql::schema_metadata::StaticMetadata;
use pathsql::{PathQueryError, PathSqlClient};
use serde_json::{json, Value};
use std::sync::Arc;

use super::common::{blog_schema, CannedExecutor};

fn client(executor: CannedExecutor, metadata: StaticMetadata) -> PathSqlClient {
    PathSqlClient::new(Arc::new(executor), Arc::new(metadata))
}

async fn run(executor: CannedExecutor, sql: &str) -> Result<Value, PathQueryError> {
    client(executor, blog_schema())
        .path_query(sql, &QueryParams::new())
        .await
}

#[tokio::test]
async fn test_posts_with_nested_comments() {
    let sql = r#"
        SELECT posts.id, posts.title, comments.id
        FROM posts
        LEFT JOIN comments ON comments.post_id = posts.id
        WHERE posts.id <= 2
        ORDER BY posts.id, comments.id
        -- PATH posts $.posts
    "#;
    let executor = CannedExecutor::new().answer(
        "FROM posts",
        &["id", "title", "id"],
        vec![
            vec![json!(1), json!("A"), json!(1)],
            vec![json!(1), json!("A"), json!(2)],
        ],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{"id": 1, "title": "A", "comments": [{"id": 1}, {"id": 2}]}]})
    );
}

#[tokio::test]
async fn test_aggregate_under_root_hint_is_an_object() {
    let executor = CannedExecutor::new().answer("count(*)", &["posts"], vec![vec![json!(2)]]);
    let tree = run(executor, "SELECT count(*) AS posts FROM posts -- PATH posts $")
        .await
        .unwrap();
    assert_eq!(tree, json!({"posts": 2}));
}

#[tokio::test]
async fn test_object_result_without_rows_is_empty_object() {
    let executor = CannedExecutor::new().answer("count(*)", &["posts"], vec![]);
    let tree = run(executor, "SELECT count(*) AS posts FROM posts -- PATH posts $")
        .await
        .unwrap();
    assert_eq!(tree, json!({}));
}

#[tokio::test]
async fn test_many_to_one_join_nests_an_object() {
    let sql = "SELECT p.id, cat.name FROM posts p LEFT JOIN categories cat ON p.category_id = cat.id \
               -- PATH p $.posts";
    let executor = CannedExecutor::new().answer(
        "FROM posts p",
        &["id", "name"],
        vec![
            vec![json!(1), json!("news")],
            vec![json!(2), json!("news")],
        ],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!({"posts": [
            {"id": 1, "cat": {"name": "news"}},
            {"id": 2, "cat": {"name": "news"}}
        ]})
    );
}

#[tokio::test]
async fn test_single_table_is_a_flat_array() {
    let executor = CannedExecutor::new().answer(
        "FROM posts",
        &["id", "title"],
        vec![
            vec![json!(1), json!("A")],
            vec![json!(2), json!("B")],
        ],
    );
    let tree = run(executor, "SELECT id, title FROM posts ORDER BY id")
        .await
        .unwrap();
    assert_eq!(tree, json!([{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]));
}

#[tokio::test]
async fn test_empty_array_result() {
    let executor = CannedExecutor::new().answer("FROM posts", &["id"], vec![]);
    let tree = run(executor, "SELECT id FROM posts WHERE 1 = 0").await.unwrap();
    assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn test_sibling_fan_out_is_deduplicated() {
    let sql = "SELECT p.id, c.id, t.label FROM posts p \
               LEFT JOIN comments c ON c.post_id = p.id \
               LEFT JOIN tags t ON t.post_id = p.id \
               -- PATH p $.posts";
    // 2 comments x 2 tags
    let executor = CannedExecutor::new().answer(
        "FROM posts p",
        &["id", "id", "label"],
        vec![
            vec![json!(1), json!(10), json!("x")],
            vec![json!(1), json!(10), json!("y")],
            vec![json!(1), json!(11), json!("x")],
            vec![json!(1), json!(11), json!("y")],
        ],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{
            "id": 1,
            "c": [{"id": 10}, {"id": 11}],
            "t": [{"label": "x"}, {"label": "y"}]
        }]})
    );
}

#[tokio::test]
async fn test_bare_column_is_attributed_through_metadata() {
    let sql = "SELECT p.id, body FROM posts p LEFT JOIN comments c ON c.post_id = p.id \
               -- PATH p $.posts";
    let executor = CannedExecutor::new().answer(
        "FROM posts p",
        &["id", "body"],
        vec![
            vec![json!(1), json!("first")],
            vec![json!(1), json!("second")],
        ],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{"id": 1, "c": [{"body": "first"}, {"body": "second"}]}]})
    );
}

#[tokio::test]
async fn test_explicit_paths_skip_inference() {
    let sql = r#"SELECT posts.id AS "$.posts[].id", comments.id AS "$.posts[].comments[].id"
                 FROM posts JOIN comments ON comments.post_id = posts.id"#;
    let executor = CannedExecutor::new().answer(
        "FROM posts",
        &["$.posts[].id", "$.posts[].comments[].id"],
        vec![vec![json!(1), json!(1)], vec![json!(1), json!(2)]],
    );

    // No metadata at all: explicit paths never need it
    let tree = client(executor, StaticMetadata::new())
        .path_query(sql, &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{"id": 1, "comments": [{"id": 1}, {"id": 2}]}]})
    );
}

#[tokio::test]
async fn test_explicit_scalar_path() {
    let executor = CannedExecutor::new().answer(
        "count(*)",
        &["$.statistics.posts"],
        vec![vec![json!(12)]],
    );
    let tree = run(executor, r#"SELECT count(*) AS "$.statistics.posts" FROM posts"#)
        .await
        .unwrap();
    assert_eq!(tree, json!({"statistics": {"posts": 12}}));
}

#[tokio::test]
async fn test_explicit_prefix_carries_forward() {
    let executor = CannedExecutor::new().answer(
        "FROM posts",
        &["$.posts[].id", "title", "$.posts[].comments[].id", "body"],
        vec![
            vec![json!(1), json!("A"), json!(1), json!("x")],
            vec![json!(1), json!("A"), json!(2), json!("y")],
        ],
    );
    let sql = r#"SELECT p.id AS "$.posts[].id", p.title, c.id AS "$.posts[].comments[].id", c.body
                 FROM posts p JOIN comments c ON c.post_id = p.id"#;

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!({"posts": [{
            "id": 1,
            "title": "A",
            "comments": [{"id": 1, "body": "x"}, {"id": 2, "body": "y"}]
        }]})
    );
}

#[tokio::test]
async fn test_shape_conflict_is_reported() {
    let executor = CannedExecutor::new().answer(
        "FROM posts",
        &["$[].id", "$.total"],
        vec![vec![json!(1), json!(3)]],
    );
    let err = run(
        executor,
        r#"SELECT id AS "$[].id", count(*) OVER () AS "$.total" FROM posts"#,
    )
    .await
    .unwrap_err();

    match err {
        PathQueryError::Reconstruction(TreeError::ShapeConflict { path, kind }) => {
            assert_eq!(path, "$.total");
            assert_eq!(
                kind,
                ConflictKind::HiddenByArray {
                    array_path: "$[]".to_string()
                }
            );
        }
        other => panic!("expected a shape conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unresolved_joins_follow_the_join_kind() {
    let inner = CannedExecutor::new().answer(
        "FROM a",
        &["id", "id"],
        vec![vec![json!(1), json!(5)]],
    );
    let tree = client(inner, StaticMetadata::new())
        .path_query(
            "SELECT a.id, b.id FROM a JOIN b ON b.a_id = a.id",
            &QueryParams::new(),
        )
        .await
        .unwrap();
    assert_eq!(tree, json!([{"a": {"id": 1}, "b": {"id": 5}}]));

    let left = CannedExecutor::new().answer(
        "FROM a",
        &["id", "id"],
        vec![vec![json!(1), json!(5)], vec![json!(1), json!(6)]],
    );
    let tree = client(left, StaticMetadata::new())
        .path_query(
            "SELECT a.id, b.id FROM a LEFT JOIN b ON b.a_id = a.id",
            &QueryParams::new(),
        )
        .await
        .unwrap();
    assert_eq!(tree, json!([{"a": {"id": 1}, "b": [{"id": 5}, {"id": 6}]}]));
}

#[tokio::test]
async fn test_comma_join_reads_as_rows() {
    let sql = "select categories.name, count(posts.id) as post_count from posts, categories \
               where posts.category_id = categories.id group by categories.name";
    let executor = CannedExecutor::new().answer(
        "from posts",
        &["name", "post_count"],
        vec![
            vec![json!("news"), json!(2)],
            vec![json!("tech"), json!(1)],
        ],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(
        tree,
        json!([
            {"name": "news", "post_count": 2},
            {"name": "tech", "post_count": 1}
        ])
    );
}

#[tokio::test]
async fn test_comma_join_under_object_root_hint() {
    let sql = "SELECT p.title, c.name FROM posts p, categories c \
               WHERE p.category_id = c.id AND p.id = 1 -- PATH p $";
    let executor = CannedExecutor::new().answer(
        "FROM posts p",
        &["title", "name"],
        vec![vec![json!("A"), json!("news")]],
    );

    let tree = run(executor, sql).await.unwrap();
    assert_eq!(tree, json!({"title": "A", "name": "news"}));
}

#[tokio::test]
async fn test_root_hint_without_tables() {
    let executor = CannedExecutor::new().answer(
        "SELECT 1",
        &["one", "two"],
        vec![vec![json!(1), json!(2)]],
    );
    let tree = run(executor, "SELECT 1 AS one, 2 AS two -- PATH $ $.constants")
        .await
        .unwrap();
    assert_eq!(tree, json!({"constants": {"one": 1, "two": 2}}));
}

#[tokio::test]
async fn test_execution_failure_surfaces() {
    let err = run(CannedExecutor::new(), "SELECT id FROM posts")
        .await
        .unwrap_err();
    assert!(matches!(err, PathQueryError::QueryExecution(_)));
    assert!(err.to_string().contains("no canned answer"));
}
