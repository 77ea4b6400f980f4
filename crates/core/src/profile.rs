use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Topic label used when the service leaves one out.
pub const UNSET_TOPIC: &str = "NONE";

/// A derived topic/content summary produced by the service.
///
/// Profiles are read-only: they are only ever decoded from service
/// responses, never built client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileRecord")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    topic: String,
    sub_topic: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Service-assigned identifier, used by `delete_profile`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn sub_topic(&self) -> &str {
        &self.sub_topic
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileAttributes {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    sub_topic: Option<String>,
}

/// Profile as sent by the service. Topic labels live under `attributes`,
/// though a flat `topic`/`sub_topic` pair is accepted too.
#[derive(Debug, Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    id: Option<String>,
    content: String,
    #[serde(default)]
    attributes: Option<ProfileAttributes>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    sub_topic: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    updated_at: DateTime<Utc>,
}

impl From<ProfileRecord> for UserProfile {
    fn from(record: ProfileRecord) -> Self {
        let attributes = record.attributes.unwrap_or_default();
        let topic = attributes
            .topic
            .or(record.topic)
            .unwrap_or_else(|| UNSET_TOPIC.to_owned());
        let sub_topic = attributes
            .sub_topic
            .or(record.sub_topic)
            .unwrap_or_else(|| UNSET_TOPIC.to_owned());

        Self {
            id: record.id,
            topic,
            sub_topic,
            content: record.content,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// An element of a profile listing that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Position in the `profiles` array.
    pub index: usize,
    /// Decoder message.
    pub reason: String,
}

/// Result of decoding a profile listing.
///
/// Malformed elements do not fail the listing; they are collected in
/// `skipped` so callers can detect schema drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileReport {
    pub profiles: Vec<UserProfile>,
    pub skipped: Vec<SkippedEntry>,
}

impl ProfileReport {
    /// Returns `true` if every element decoded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
