use thiserror::Error;

use crate::hash::ActionHash;

/// Failure of a single comment fetch. The display text is what the view shows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Zome call failed with status {status}: {message}")]
    Zome { status: u16, message: String },

    #[error("Invalid links in response: {0}")]
    Decode(String),

    #[error("Post not found: {0}")]
    NotFound(ActionHash),
}

/// Integration faults raised when a view is activated incorrectly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActivationError {
    #[error("The post_hash property is required for the comments-for-post view")]
    MissingPostHash,

    #[error("The comments-for-post view is already active")]
    AlreadyActive,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HashError {
    #[error("Hash must start with 'u', got {0:?}")]
    MissingPrefix(String),

    #[error("Invalid base64 in hash: {0}")]
    Encoding(String),

    #[error("Invalid hash length {0} bytes (expected 39)")]
    Length(usize),

    #[error("Not an action hash (type prefix {0:02x?})")]
    WrongType([u8; 3]),
}
