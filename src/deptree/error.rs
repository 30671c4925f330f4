//! Error types for dependency-tree construction.

use thiserror::Error;

use super::node::NodeId;

/// Result alias for tree construction.
pub type Result<T> = std::result::Result<T, DeptreeError>;

/// Failures raised while building a [`DependencyTree`](super::DependencyTree).
///
/// Query-time conditions (missing ancestor, empty tree, inconsistent
/// fragment) are not errors; they surface as `None` or empty results.
#[derive(Debug, Error)]
pub enum DeptreeError {
    /// The parsing service was unreachable, timed out or answered with
    /// something other than exactly one sentence.
    #[error("dependency parse failed: {0}")]
    ParseFailure(String),

    /// A token could not be located in the original text from the cursor on.
    #[error("cannot align token {id} ({word:?}) at or after offset {cursor}")]
    AlignmentFailure {
        id: NodeId,
        word: Option<String>,
        cursor: usize,
    },

    /// The parse violates the tree contract (id gaps, dangling heads, cycles).
    #[error("malformed dependency graph: {0}")]
    MalformedGraph(String),
}

impl DeptreeError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedGraph(msg.into())
    }
}

impl From<reqwest::Error> for DeptreeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ParseFailure(format!("parser request timed out: {err}"))
        } else {
            Self::ParseFailure(err.to_string())
        }
    }
}
