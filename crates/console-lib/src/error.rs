//! Error taxonomy for the synchronization layer
//!
//! Transport failures and non-success statuses are equivalent from the
//! cache's point of view: the slot reverts to absent and a later fetch
//! may retry. Decode failures are caught at the response boundary rather
//! than surfacing on first field access downstream.

use thiserror::Error;

/// Errors surfaced by the API client and the data store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request could not be sent or the transport failed mid-flight.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("api error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("malformed payload: {0}")]
    Decode(#[source] reqwest::Error),

    /// Base URL or joined path could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Slot key did not carry the fields its resource kind requires.
    #[error("malformed slot key: {slot}")]
    InvalidKey { slot: String },

    /// A fetch this caller attached to failed; the error was reported in
    /// full by the caller that issued the request.
    #[error("joined fetch for {slot} failed: {reason}")]
    FlightFailed { slot: String, reason: String },

    /// Cached value held a different resource kind than requested.
    #[error("cache slot holds a different resource kind (expected {expected})")]
    KindMismatch { expected: &'static str },
}
