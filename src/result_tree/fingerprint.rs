//! Content fingerprints for array elements
//!
//! Join fan-out repeats a parent's columns once per child row. Every array
//! element is identified by the SHA-256 of its own direct leaves, so repeated
//! parents land in the same bucket and merge.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use super::errors::TreeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash the ordered `(name, value)` leaves of one array element.
    pub fn of_leaves(prefix: &str, leaves: &[(&str, &Value)]) -> Result<Self, TreeError> {
        let bytes = serde_json::to_vec(leaves).map_err(|e| TreeError::Fingerprint {
            prefix: prefix.to_string(),
            message: e.to_string(),
        })?;
        Ok(Fingerprint(Sha256::digest(&bytes).into()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
