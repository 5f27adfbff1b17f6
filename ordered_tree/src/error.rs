use thiserror::Error;

/// Why a bulk construction was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("keys and values must not be empty")]
    Empty,

    #[error("got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },

    #[error("key/value pairs did not satisfy BST property")]
    NotSearchTree,
}

/// Errors returned by [`OrderedTree`](crate::OrderedTree).
///
/// Missing keys in `get` and `remove` are not errors, those return `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("key not in tree")]
    NotFound,
}
