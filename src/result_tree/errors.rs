use std::fmt::Display;

use thiserror::Error;

/// Why two values could not share one output path
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// Fields and array elements under the same parent
    HiddenByArray { array_path: String },
    /// A scalar where an object (or array) also has to live, or the reverse
    ScalarAndObject,
}

impl Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::HiddenByArray { array_path } => {
                write!(f, "hidden by the path \"{array_path}\"")
            }
            ConflictKind::ScalarAndObject => write!(f, "holds both a scalar and a nested value"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeError {
    #[error("The path \"{path}\" is {kind}")]
    ShapeConflict { path: String, kind: ConflictKind },

    #[error("Row {row} has {cells} cells but {paths} paths were assigned")]
    RowWidthMismatch {
        row: usize,
        cells: usize,
        paths: usize,
    },

    #[error("Failed to fingerprint the group at \"{prefix}\": {message}")]
    Fingerprint { prefix: String, message: String },
}
