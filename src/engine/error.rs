//! Error types for the engine.

use thiserror::Error;

/// A failed exchange with the remote model.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model response had no choices")]
    NoChoices,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid case format: {0}")]
    Format(String),
}

/// Any recoverable failure reported back as a turn outcome.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("round-trip failed: {0}")]
    RoundTrip(#[from] ClientError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}
