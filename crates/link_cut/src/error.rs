//! Error types for forest operations.

use thiserror::Error;

/// Precondition violations reported by [`crate::LinkCutForest`] operations.
///
/// None of these are transient: every operation either completes fully or
/// returns an error while leaving the logical forest unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForestError {
    #[error("node handle does not belong to this forest")]
    InvalidNode,

    #[error("nodes are already in the same tree")]
    AlreadyConnected,

    #[error("node to attach is not the root of its tree")]
    NotARoot,

    #[error("node is the root of its tree and has no parent edge")]
    NoParent,

    #[error("nodes are in different trees")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, ForestError>;
