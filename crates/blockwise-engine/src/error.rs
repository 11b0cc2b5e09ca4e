use thiserror::Error;

use crate::BlockId;

/// Errors raised by the document store, the registry and document loading.
///
/// Remove-family operations never produce `DanglingId`: deleting a block that
/// is already gone is a no-op. Update and replace calls against a missing id
/// do, because the caller's intent cannot be satisfied.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("index {index} out of bounds for document of length {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("block not found: {0}")]
    DanglingId(BlockId),

    #[error("cannot remove the last remaining block")]
    LastBlock,

    #[error("duplicate block id in document: {0}")]
    DuplicateId(BlockId),

    #[error("no default block type registered")]
    NoDefaultBlock,

    #[error("internal store error: {0}")]
    Internal(String),

    #[error("invalid document json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
