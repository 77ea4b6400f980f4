use thiserror::Error;

/// Errors raised while interpreting service responses and blob payloads.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// The response body is not a valid envelope.
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// The service answered with a non-success status.
    #[error("service error (status {status}): {message}")]
    Service {
        /// Status code reported in the envelope.
        status: i64,
        /// Message reported by the service, or a generic fallback.
        message: String,
    },

    /// An expected payload key is missing or has the wrong shape.
    #[error("unexpected format for '{key}': {detail}")]
    Format {
        /// Offending key, with an index suffix for sequence elements (`ids[2]`).
        key: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The blob discriminant is not one of the known kinds.
    #[error("unknown blob type: '{0}'")]
    UnknownBlobType(String),

    /// The nested blob payload does not match its discriminant.
    #[error("invalid {blob_type} blob payload: {detail}")]
    InvalidBlob {
        /// Discriminant the payload was decoded against.
        blob_type: String,
        /// Decoder message.
        detail: String,
    },
}

impl ProtocolError {
    pub(crate) fn format(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Format {
            key: key.into(),
            detail: detail.into(),
        }
    }
}
