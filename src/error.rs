use thiserror::Error;

/// Hard failures of the normalization pipeline.
///
/// Soft failures (unparseable duration, unknown airport, missing
/// coordinates) never surface here; they degrade in place so a request can
/// still complete with partial fidelity.
#[derive(Error, Debug)]
pub enum Error {
    /// A flight record without a parseable time is unusable; callers must
    /// not attempt recovery.
    #[error("malformed timestamp: {text:?}")]
    MalformedTimestamp { text: String },

    /// The payload deserialized but is structurally unusable.
    #[error("malformed payload: {0}")]
    MalformedPayload(&'static str),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
