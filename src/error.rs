// File: ./src/error.rs
use thiserror::Error;

/// Failures seen at the event store boundary.
///
/// None of these reach the user: the store logs them and falls back to the
/// local file, and the controller keeps its previous state.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No usable remote credentials. Selects local mode, never logged as a failure.
    #[error("remote backend not configured")]
    ConfigMissing,

    /// Transport error, non-2xx status or undecodable body from the remote.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The `star_events` relation does not exist yet. Accepted by the probe.
    #[error("remote schema not provisioned: {0}")]
    SchemaNotProvisioned(String),

    #[error("local storage error: {0}")]
    Local(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
