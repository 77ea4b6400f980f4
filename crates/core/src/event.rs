use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob::Fields;
use crate::timestamp;

/// A memory event recorded by the service while processing a user's blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub id: String,
    /// Service-defined event body (summary, tags, ...).
    #[serde(default)]
    pub event_data: Fields,
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
