//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The agent's final text does not follow the advisory JSON contract.
///
/// Callers fall back to showing the raw text.
#[derive(Error, Debug)]
pub enum ResultParseError {
    #[error("Agent returned non-JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Agent returned JSON that is not an object")]
    NotAnObject,
}

/// Location auto-detect failed
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Location lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Location lookup returned status {0}")]
    Status(u16),
}
