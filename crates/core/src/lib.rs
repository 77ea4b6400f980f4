//! Core types for the Memobase client.
//!
//! - [`blob`]: the typed blob model and its wire form.
//! - [`envelope`]: decoding of the `{status, message, data}` response envelope.
//! - [`profile`] and [`event`]: records derived by the service.
//!
//! Nothing here performs I/O; the HTTP side lives in `memobase-client`.

pub mod blob;
pub mod envelope;
pub mod error;
pub mod event;
pub mod profile;
pub mod timestamp;

pub use blob::{
    Blob, BlobContent, BlobData, BlobType, ChatBlob, ChatMessage, CodeBlob, DocBlob, Fields,
    ImageBlob, TranscriptBlob, TranscriptStamp,
};
pub use envelope::{Envelope, Payload, unpack};
pub use error::ProtocolError;
pub use event::UserEvent;
pub use profile::{ProfileReport, SkippedEntry, UserProfile};
