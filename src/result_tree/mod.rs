//! Row collection and tree reconstruction
//!
//! `collect_records` pairs executed rows with their output paths;
//! `reconstruct` folds the resulting flat records into one JSON tree.

pub mod errors;
mod fingerprint;
mod reconstruct;
mod row_collector;

pub use errors::{ConflictKind, TreeError};
pub use fingerprint::Fingerprint;
pub use reconstruct::reconstruct;
pub use row_collector::{collect_records, normalize_raw_cell, record_key, FlatRecord};
