//! Integration tests - the full SQL -> tree pipeline
//!
//! Queries run against an in-memory executor that answers with canned rows, so
//! analysis, inference, collection and reconstruction are exercised together
//! without a database.

mod common;
mod metadata_introspection_tests;
mod path_query_tests;
