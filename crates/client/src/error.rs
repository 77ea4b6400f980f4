//! Error types for the Memobase client.

use memobase_core::ProtocolError;
use thiserror::Error;

/// Errors that can occur when using the Memobase client.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure (network, DNS, TLS, timeout).
    #[error("connection error: {0}")]
    Connection(String),

    /// Non-2xx HTTP status whose body was not a response envelope.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The service reported a failure in the response envelope.
    #[error("service error (status {status}): {message}")]
    Service {
        /// Envelope status code.
        status: i64,
        /// Service-provided message.
        message: String,
    },

    /// Response body could not be decoded as an envelope.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// An expected payload key was missing or had the wrong shape.
    #[error("unexpected format for '{key}': {detail}")]
    Format {
        /// Offending key, e.g. `ids` or `ids[3]`.
        key: String,
        /// What was wrong with it.
        detail: String,
    },

    /// A stored blob carries a discriminant this client does not know.
    #[error("unknown blob type: '{0}'")]
    UnknownBlobType(String),

    /// A stored blob's payload does not match its discriminant.
    #[error("invalid {blob_type} blob payload: {detail}")]
    InvalidBlob {
        /// Discriminant of the blob.
        blob_type: String,
        /// Decoder message.
        detail: String,
    },

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Malformed(detail) => Self::Deserialization(detail),
            ProtocolError::Service { status, message } => Self::Service { status, message },
            ProtocolError::Format { key, detail } => Self::Format { key, detail },
            ProtocolError::UnknownBlobType(t) => Self::UnknownBlobType(t),
            ProtocolError::InvalidBlob { blob_type, detail } => {
                Self::InvalidBlob { blob_type, detail }
            }
        }
    }
}

impl Error {
    /// Returns `true` if this is a transport failure.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the service itself reported the failure.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    /// Returns the envelope status if this is a service error.
    pub fn service_status(&self) -> Option<i64> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
