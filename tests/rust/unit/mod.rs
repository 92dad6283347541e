//! Unit tests for the public analyzer and executor helpers
//!
//! Run with: cargo test --test unit

mod analyzer_robustness_tests;
