//! Typed blob model.
//!
//! A [`Blob`] is one unit of user-submitted content. Its kind is fixed by the
//! [`BlobContent`] variant it was built from; shared metadata (`fields`,
//! `created_at`) sits next to it. On the wire a blob travels as [`BlobData`]:
//!
//! ```json
//! {
//!   "blob_type": "chat",
//!   "blob_data": { "messages": [{ "role": "user", "content": "hi" }] },
//!   "fields": { "source": "web" },
//!   "created_at": "2025-01-01T00:00:00Z"
//! }
//! ```
//!
//! `fields` and `created_at` are omitted when empty/unset, never sent as `null`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::timestamp;

/// Open-ended metadata mapping attached to blobs and users.
pub type Fields = Map<String, Value>;

/// Discriminant identifying which blob variant a value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobType {
    Chat,
    Doc,
    Image,
    Code,
    Transcript,
}

impl BlobType {
    /// Every known blob type, in wire order.
    pub const ALL: [Self; 5] = [
        Self::Chat,
        Self::Doc,
        Self::Image,
        Self::Code,
        Self::Transcript,
    ];

    /// Wire representation of the discriminant.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Doc => "doc",
            Self::Image => "image",
            Self::Code => "code",
            Self::Transcript => "transcript",
        }
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlobType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownBlobType(s.to_owned()))
    }
}

/// One message of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role, usually `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
    /// Optional display name for the speaker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Optional per-message timestamp, passed through as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            alias: None,
            created_at: None,
        }
    }

    /// A message with the `user` role.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// A message with the `assistant` role.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

/// Ordered chat transcript. Message order is conversation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatBlob {
    pub messages: Vec<ChatMessage>,
}

/// Free-text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocBlob {
    pub content: String,
}

/// Source code snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlob {
    pub content: String,
    /// Language tag such as `rust` or `python`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Image referenced by URL or carried inline as base64.
///
/// Exactly one of the two is expected. This is not enforced here; the
/// service decides what to accept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl ImageBlob {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            base64: None,
        }
    }

    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            url: None,
            base64: Some(data.into()),
        }
    }

    /// Returns `true` if exactly one of `url` and `base64` is set.
    pub fn is_well_formed(&self) -> bool {
        self.url.is_some() != self.base64.is_some()
    }
}

/// A timed segment of an audio transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptStamp {
    pub content: String,
    pub start_timestamp_in_seconds: f64,
    /// End offset. `None` means open-ended, which is not the same as `0.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_timestamp_in_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl TranscriptStamp {
    pub fn new(content: impl Into<String>, start_timestamp_in_seconds: f64) -> Self {
        Self {
            content: content.into(),
            start_timestamp_in_seconds,
            end_time_timestamp_in_seconds: None,
            speaker: None,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end_timestamp_in_seconds: f64) -> Self {
        self.end_time_timestamp_in_seconds = Some(end_timestamp_in_seconds);
        self
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

/// Ordered audio transcript.
///
/// Offsets must be finite. Their order is not checked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranscriptBlob {
    pub transcripts: Vec<TranscriptStamp>,
}

/// Variant-specific content of a blob.
///
/// Serializes as the bare variant struct, which becomes the `blob_data`
/// object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlobContent {
    Chat(ChatBlob),
    Doc(DocBlob),
    Image(ImageBlob),
    Code(CodeBlob),
    Transcript(TranscriptBlob),
}

impl BlobContent {
    pub fn blob_type(&self) -> BlobType {
        match self {
            Self::Chat(_) => BlobType::Chat,
            Self::Doc(_) => BlobType::Doc,
            Self::Image(_) => BlobType::Image,
            Self::Code(_) => BlobType::Code,
            Self::Transcript(_) => BlobType::Transcript,
        }
    }

    /// Check invariants the wire form cannot express.
    ///
    /// JSON has no NaN or infinity, so non-finite transcript offsets would be
    /// written as `null` and the stored blob could not be read back.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let Self::Transcript(transcript) = self else {
            return Ok(());
        };
        for (i, stamp) in transcript.transcripts.iter().enumerate() {
            let end_ok = stamp.end_time_timestamp_in_seconds.is_none_or(f64::is_finite);
            if !stamp.start_timestamp_in_seconds.is_finite() || !end_ok {
                return Err(ProtocolError::InvalidBlob {
                    blob_type: BlobType::Transcript.to_string(),
                    detail: format!("transcripts[{i}] has a non-finite offset"),
                });
            }
        }
        Ok(())
    }

    /// Decode a nested payload against a known discriminant.
    pub fn decode(blob_type: BlobType, payload: Fields) -> Result<Self, ProtocolError> {
        let payload = Value::Object(payload);
        Ok(match blob_type {
            BlobType::Chat => Self::Chat(decode_variant(blob_type, payload)?),
            BlobType::Doc => Self::Doc(decode_variant(blob_type, payload)?),
            BlobType::Image => Self::Image(decode_variant(blob_type, payload)?),
            BlobType::Code => Self::Code(decode_variant(blob_type, payload)?),
            BlobType::Transcript => Self::Transcript(decode_variant(blob_type, payload)?),
        })
    }
}

fn decode_variant<T: DeserializeOwned>(
    blob_type: BlobType,
    payload: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|e| ProtocolError::InvalidBlob {
        blob_type: blob_type.to_string(),
        detail: e.to_string(),
    })
}

impl From<ChatBlob> for BlobContent {
    fn from(blob: ChatBlob) -> Self {
        Self::Chat(blob)
    }
}

impl From<DocBlob> for BlobContent {
    fn from(blob: DocBlob) -> Self {
        Self::Doc(blob)
    }
}

impl From<ImageBlob> for BlobContent {
    fn from(blob: ImageBlob) -> Self {
        Self::Image(blob)
    }
}

impl From<CodeBlob> for BlobContent {
    fn from(blob: CodeBlob) -> Self {
        Self::Code(blob)
    }
}

impl From<TranscriptBlob> for BlobContent {
    fn from(blob: TranscriptBlob) -> Self {
        Self::Transcript(blob)
    }
}

/// A unit of user-submitted content of one specific kind.
///
/// The content variant is fixed at construction; use [`Blob::content`] to
/// read it. Metadata and the creation timestamp may be changed freely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BlobData")]
pub struct Blob {
    content: BlobContent,
    /// Caller-supplied metadata. Sent only when non-empty.
    pub fields: Fields,
    /// Creation timestamp. Sent only when set.
    pub created_at: Option<DateTime<Utc>>,
}

impl Blob {
    pub fn new(content: impl Into<BlobContent>) -> Self {
        Self {
            content: content.into(),
            fields: Fields::new(),
            created_at: None,
        }
    }

    /// A chat blob from an ordered list of messages.
    pub fn chat(messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        Self::new(ChatBlob {
            messages: messages.into_iter().collect(),
        })
    }

    pub fn doc(content: impl Into<String>) -> Self {
        Self::new(DocBlob {
            content: content.into(),
        })
    }

    pub fn code(content: impl Into<String>, language: Option<String>) -> Self {
        Self::new(CodeBlob {
            content: content.into(),
            language,
        })
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::new(ImageBlob::from_url(url))
    }

    pub fn image_base64(data: impl Into<String>) -> Self {
        Self::new(ImageBlob::from_base64(data))
    }

    pub fn transcript(stamps: impl IntoIterator<Item = TranscriptStamp>) -> Self {
        Self::new(TranscriptBlob {
            transcripts: stamps.into_iter().collect(),
        })
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn blob_type(&self) -> BlobType {
        self.content.blob_type()
    }

    pub fn content(&self) -> &BlobContent {
        &self.content
    }

    pub fn into_content(self) -> BlobContent {
        self.content
    }

    /// Convert into the wire envelope. `updated_at` is left unset.
    pub fn to_data(&self) -> Result<BlobData, ProtocolError> {
        self.content.validate()?;
        let blob_data = match serde_json::to_value(&self.content) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(ProtocolError::InvalidBlob {
                    blob_type: self.blob_type().to_string(),
                    detail: format!("content serialized to non-object {other}"),
                });
            }
            Err(e) => {
                return Err(ProtocolError::InvalidBlob {
                    blob_type: self.blob_type().to_string(),
                    detail: e.to_string(),
                });
            }
        };

        Ok(BlobData {
            blob_type: self.blob_type().to_string(),
            blob_data,
            fields: self.fields.clone(),
            created_at: self.created_at,
            updated_at: None,
        })
    }
}

#[derive(Serialize)]
struct WireBlob<'a> {
    blob_type: BlobType,
    blob_data: &'a BlobContent,
    #[serde(skip_serializing_if = "is_empty_ref")]
    fields: &'a Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<&'a DateTime<Utc>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_empty_ref(fields: &&Fields) -> bool {
    fields.is_empty()
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.content.validate().map_err(serde::ser::Error::custom)?;
        WireBlob {
            blob_type: self.blob_type(),
            blob_data: &self.content,
            fields: &self.fields,
            created_at: self.created_at.as_ref(),
        }
        .serialize(serializer)
    }
}

impl TryFrom<BlobData> for Blob {
    type Error = ProtocolError;

    fn try_from(data: BlobData) -> Result<Self, Self::Error> {
        let blob_type: BlobType = data.blob_type.parse()?;
        let content = BlobContent::decode(blob_type, data.blob_data)?;
        Ok(Self {
            content,
            fields: data.fields,
            created_at: data.created_at,
        })
    }
}

/// Wire-level form of a stored blob, as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobData {
    /// Raw discriminant. Parsed only when converting into a [`Blob`].
    pub blob_type: String,
    /// Variant-specific payload.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blob_data: Fields,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub fields: Fields,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BlobData {
    /// Parse the discriminant without decoding the payload.
    pub fn kind(&self) -> Result<BlobType, ProtocolError> {
        self.blob_type.parse()
    }

    /// Reconstruct the typed blob.
    pub fn into_blob(self) -> Result<Blob, ProtocolError> {
        Blob::try_from(self)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Fields, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Fields>::deserialize(deserializer)?.unwrap_or_default())
}
