//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from talking to the storefront backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// A condition the user has to fix before an action can run.
///
/// These are surfaced as prompts rather than failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    #[error("You need to log in first")]
    LoginRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("No delivery address set")]
    NoDefaultAddress,
}

/// Errors from the local token and snapshot files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error at {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Corrupt file {0}: {1}")]
    Corrupt(PathBuf, serde_json::Error),
}
