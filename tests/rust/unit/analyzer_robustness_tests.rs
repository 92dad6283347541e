#[cfg(test)]
mod analyzer_robustness_tests {
    use pathsql::executor::{substitute_parameters, ParameterError, QueryParams};
    use pathsql::query_analyzer::{analyze_query, extract_path_hints, strip_comments, JoinKind};
    use serde_json::json;

    #[test]
    fn test_malformed_sql_never_panics() {
        let inputs = vec![
            "",
            "SELECT",
            "FROM",
            "SELECT FROM",
            "SELECT * FROM",
            "SELECT a, FROM t",
            "SELECT (((a FROM t",
            "SELECT a))) FROM t",
            "SELECT 'unterminated FROM t",
            "SELECT a FROM t JOIN",
            "SELECT a FROM t JOIN u ON",
            "SELECT a FROM t LEFT OUTER",
            "SELECT a FROM t /* never closed",
            "-- PATH",
            "-- PATH p",
            "SELECT a FROM t -- PATH t",
            "SELECT é, ü FROM café c JOIN naïve n ON n.id = c.id",
            ";;;",
        ];

        for sql in inputs {
            let shape = analyze_query(sql);
            assert!(shape.joins().len() <= shape.tables().len(), "{sql}");
        }
    }

    #[test]
    fn test_join_kinds_are_recognized() {
        let cases = vec![
            ("JOIN", JoinKind::Inner),
            ("INNER JOIN", JoinKind::Inner),
            ("LEFT JOIN", JoinKind::Left),
            ("LEFT OUTER JOIN", JoinKind::Left),
            ("RIGHT JOIN", JoinKind::Right),
            ("FULL OUTER JOIN", JoinKind::Outer),
            ("CROSS JOIN", JoinKind::Cross),
        ];

        for (keyword, expected) in cases {
            let sql = format!("SELECT p.id FROM posts p {keyword} comments c ON c.post_id = p.id");
            let shape = analyze_query(&sql);
            assert_eq!(shape.joins().len(), 1, "{keyword}");
            assert_eq!(shape.joins()[0].kind, expected, "{keyword}");
            assert_eq!(shape.joins()[0].right_table, "comments", "{keyword}");
        }
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let shape = analyze_query(
            "select p.id from posts as p left join comments as c on c.post_id = p.id",
        );
        assert_eq!(shape.table_for_alias("p"), Some("posts"));
        assert_eq!(shape.table_for_alias("c"), Some("comments"));
        assert_eq!(shape.joins()[0].kind, JoinKind::Left);
    }

    #[test]
    fn test_subquery_tables_do_not_leak() {
        let shape = analyze_query(
            "SELECT p.id, (SELECT count(*) FROM comments c WHERE c.post_id = p.id) AS n \
             FROM posts p",
        );
        assert_eq!(shape.tables().len(), 1);
        assert_eq!(shape.table_for_alias("p"), Some("posts"));
        assert_eq!(shape.select_items().len(), 2);
    }

    #[test]
    fn test_join_markers_inside_literals_are_ignored() {
        let shape = analyze_query("SELECT 'a JOIN b ON x' AS label FROM posts");
        assert!(shape.joins().is_empty());
        assert_eq!(shape.tables().len(), 1);
    }

    #[test]
    fn test_strip_comments_keeps_literal_markers() {
        let sql = "SELECT '/* kept */' AS a, '-- kept' AS b -- dropped\nFROM t";
        assert_eq!(
            strip_comments(sql),
            "SELECT '/* kept */' AS a, '-- kept' AS b \nFROM t"
        );
    }

    #[test]
    fn test_hints_on_separate_lines() {
        let hints = extract_path_hints(
            "SELECT 1\n-- PATH p $.posts\n-- PATH c $.posts[].comments\n-- PATH $ $.data",
        );
        assert_eq!(hints.len(), 3);
        assert_eq!(hints.get("p").map(String::as_str), Some("$.posts"));
        assert_eq!(
            hints.get("c").map(String::as_str),
            Some("$.posts[].comments")
        );
        assert_eq!(hints.get("$").map(String::as_str), Some("$.data"));
    }

    #[test]
    fn test_parameters_bind_inside_analyzed_query() {
        let mut params = QueryParams::new();
        params.insert("id".to_string(), json!(7));
        params.insert("title".to_string(), json!("it's"));

        let sql = substitute_parameters(
            "SELECT id::text FROM posts WHERE id = :id AND title = :title -- :ignored",
            &params,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT id::text FROM posts WHERE id = 7 AND title = 'it\\'s' -- :ignored"
        );
    }

    #[test]
    fn test_missing_parameter_is_reported_by_name() {
        let err = substitute_parameters("SELECT :nope", &QueryParams::new()).unwrap_err();
        assert_eq!(err, ParameterError::Missing("nope".to_string()));
    }
}
