//! Error kinds shared by the client, normalizer, and orchestrator.
//!
//! Library code returns [`Result`]; the binary edge wraps fatal errors with
//! `anyhow` context before printing and exiting non-zero.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration, detected before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-level failure: timeout, connection refused, DNS.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status. `body` carries a
    /// truncated excerpt of the response body for diagnostics.
    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    /// The payload shape was unrecognizable.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
