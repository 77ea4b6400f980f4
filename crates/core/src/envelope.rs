//! Response envelope.
//!
//! Every service reply has the shape
//!
//! ```json
//! { "status": 0, "message": "optional text", "data": { ... } }
//! ```
//!
//! `status == 0` is success. Any other status is a service-reported failure
//! and the `data` member is discarded, whatever it contains. The service's
//! native `errno`/`errmsg` member names are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blob::{BlobData, Fields};
use crate::error::ProtocolError;
use crate::event::UserEvent;
use crate::profile::{ProfileReport, SkippedEntry, UserProfile};

/// Status code signalling success.
pub const SUCCESS_STATUS: i64 = 0;

/// Message used when a failure envelope carries no message of its own.
pub const GENERIC_SERVICE_ERROR: &str = "unknown service error";

/// Decoded service reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(alias = "errno")]
    pub status: i64,
    #[serde(default, alias = "errmsg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(body).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Turn the envelope into its payload, or the service error it reports.
    pub fn into_payload(self) -> Result<Payload, ProtocolError> {
        if !self.is_success() {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_owned());
            return Err(ProtocolError::Service {
                status: self.status,
                message,
            });
        }

        match self.data {
            None | Some(Value::Null) => Ok(Payload::default()),
            Some(Value::Object(map)) => Ok(Payload(map)),
            Some(other) => Err(ProtocolError::format(
                "data",
                format!("expected an object, got {}", kind_of(&other)),
            )),
        }
    }
}

/// Decode a response body into its success payload.
///
/// This is the single choke point every operation goes through.
pub fn unpack(body: &[u8]) -> Result<Payload, ProtocolError> {
    Envelope::from_slice(body)?.into_payload()
}

/// Success payload of an envelope, keyed by string.
///
/// Callers know from context which keys to expect; the typed accessors
/// below validate shape and report the offending key on mismatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The `id` assigned by a creation call.
    pub fn id(&self) -> Result<String, ProtocolError> {
        self.string("id")
    }

    /// The `ids` listing of a paginated query.
    ///
    /// Every element must be a string; no partial result is returned.
    pub fn ids(&self) -> Result<Vec<String>, ProtocolError> {
        self.array("ids")?
            .iter()
            .enumerate()
            .map(|(i, value)| {
                value.as_str().map(str::to_owned).ok_or_else(|| {
                    ProtocolError::format(
                        format!("ids[{i}]"),
                        format!("expected a string, got {}", kind_of(value)),
                    )
                })
            })
            .collect()
    }

    /// The `profiles` listing.
    ///
    /// The array itself must be present. Elements that fail to decode are
    /// skipped and reported in [`ProfileReport::skipped`].
    pub fn profiles(&self) -> Result<ProfileReport, ProtocolError> {
        let mut report = ProfileReport::default();
        for (index, value) in self.array("profiles")?.iter().enumerate() {
            match UserProfile::deserialize(value) {
                Ok(profile) => report.profiles.push(profile),
                Err(e) => report.skipped.push(SkippedEntry {
                    index,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(report)
    }

    /// The `events` listing. Any malformed element fails the call.
    pub fn events(&self) -> Result<Vec<UserEvent>, ProtocolError> {
        self.array("events")?
            .iter()
            .enumerate()
            .map(|(i, value)| {
                UserEvent::deserialize(value)
                    .map_err(|e| ProtocolError::format(format!("events[{i}]"), e.to_string()))
            })
            .collect()
    }

    /// The `context` prompt text.
    pub fn context(&self) -> Result<String, ProtocolError> {
        self.string("context")
    }

    /// Decode the whole payload as a stored blob.
    pub fn into_blob_data(self) -> Result<BlobData, ProtocolError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| ProtocolError::format("blob", e.to_string()))
    }

    /// Hand back the payload as an open metadata mapping.
    pub fn into_fields(self) -> Fields {
        self.0
    }

    fn string(&self, key: &str) -> Result<String, ProtocolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(ProtocolError::format(
                key,
                format!("expected a string, got {}", kind_of(other)),
            )),
            None => Err(ProtocolError::format(key, "missing from payload")),
        }
    }

    fn array(&self, key: &str) -> Result<&Vec<Value>, ProtocolError> {
        match self.0.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ProtocolError::format(
                key,
                format!("expected an array, got {}", kind_of(other)),
            )),
            None => Err(ProtocolError::format(key, "missing from payload")),
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::blob::{Blob, BlobType};

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn success_yields_id() {
        let payload = unpack(br#"{"status":0,"data":{"id":"abc"}}"#).unwrap();
        assert_eq!(payload.id().unwrap(), "abc");
    }

    #[test]
    fn failure_carries_message_and_drops_data() {
        let err = unpack(br#"{"status":1,"message":"not found","data":{"id":"abc"}}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Service {
                status: 1,
                message: "not found".into()
            }
        );
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let err = unpack(br#"{"status":500}"#).unwrap_err();
        assert!(err.to_string().contains(GENERIC_SERVICE_ERROR));

        let err = unpack(br#"{"status":500,"message":""}"#).unwrap_err();
        assert!(err.to_string().contains(GENERIC_SERVICE_ERROR));
    }

    #[test]
    fn accepts_native_errno_names() {
        let err = unpack(br#"{"errno":404,"errmsg":"user missing","data":null}"#).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Service {
                status: 404,
                message: "user missing".into()
            }
        );

        let payload = unpack(br#"{"errno":0,"errmsg":"","data":{"id":"u1"}}"#).unwrap();
        assert_eq!(payload.id().unwrap(), "u1");
    }

    #[test]
    fn malformed_body_is_distinct_from_service_failure() {
        assert!(matches!(
            unpack(b"<html>bad gateway</html>"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            unpack(br#"{"message":"no status"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn absent_data_is_empty_payload() {
        let payload = unpack(br#"{"status":0}"#).unwrap();
        assert!(payload.is_empty());
        let payload = unpack(br#"{"status":0,"data":null}"#).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn non_object_data_is_format_error() {
        let err = unpack(br#"{"status":0,"data":[1]}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Format { ref key, .. } if key == "data"));
    }

    #[test]
    fn missing_id_is_format_error() {
        let payload = unpack(br#"{"status":0,"data":{}}"#).unwrap();
        assert!(matches!(payload.id(), Err(ProtocolError::Format { ref key, .. }) if key == "id"));
    }

    #[test]
    fn ids_decode() {
        let payload = unpack(&body(&json!({"status": 0, "data": {"ids": ["a", "b"]}}))).unwrap();
        assert_eq!(payload.ids().unwrap(), ["a", "b"]);
    }

    #[test]
    fn non_string_ids_are_format_error() {
        let payload = unpack(br#"{"status":0,"data":{"ids":[1,2,3]}}"#).unwrap();
        let err = payload.ids().unwrap_err();
        assert!(matches!(err, ProtocolError::Format { ref key, .. } if key == "ids[0]"));
    }

    #[test]
    fn mixed_ids_report_first_bad_index() {
        let payload = unpack(br#"{"status":0,"data":{"ids":["a",2,"c"]}}"#).unwrap();
        let err = payload.ids().unwrap_err();
        assert!(matches!(err, ProtocolError::Format { ref key, .. } if key == "ids[1]"));
    }

    #[test]
    fn ids_not_an_array_is_format_error() {
        let payload = unpack(br#"{"status":0,"data":{"ids":"a,b"}}"#).unwrap();
        assert!(matches!(payload.ids(), Err(ProtocolError::Format { ref key, .. }) if key == "ids"));
    }

    #[test]
    fn profiles_skip_malformed_entries() {
        let payload = unpack(&body(&json!({
            "status": 0,
            "data": {"profiles": [
                {
                    "id": "p1",
                    "content": "Gus",
                    "attributes": {"topic": "basic_info", "sub_topic": "name"},
                    "updated_at": "2025-01-01T00:00:00Z"
                },
                {"content": 42}
            ]}
        })))
        .unwrap();

        let report = payload.profiles().unwrap();
        assert_eq!(report.profiles.len(), 1);
        assert_eq!(report.profiles[0].content(), "Gus");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn profiles_skip_non_object_entries() {
        let payload = unpack(br#"{"status":0,"data":{"profiles":["oops", null]}}"#).unwrap();
        let report = payload.profiles().unwrap();
        assert!(report.profiles.is_empty());
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn profiles_wrong_shape_is_hard_error() {
        let payload = unpack(br#"{"status":0,"data":{"profiles":{"a":1}}}"#).unwrap();
        assert!(payload.profiles().is_err());
        let payload = unpack(br#"{"status":0,"data":{}}"#).unwrap();
        assert!(payload.profiles().is_err());
    }

    #[test]
    fn events_are_strict() {
        let payload = unpack(br#"{"status":0,"data":{"events":[{"id":"e1"},{"event_data":{}}]}}"#)
            .unwrap();
        let err = payload.events().unwrap_err();
        assert!(matches!(err, ProtocolError::Format { ref key, .. } if key == "events[1]"));
    }

    #[test]
    fn context_string() {
        let payload = unpack(br##"{"status":0,"data":{"context":"# Memory"}}"##).unwrap();
        assert_eq!(payload.context().unwrap(), "# Memory");
    }

    #[test]
    fn blob_payload_reconstructs_variant() {
        let payload = unpack(&body(&json!({
            "status": 0,
            "data": {
                "blob_type": "code",
                "blob_data": {"content": "fn main() {}", "language": "rust"},
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            }
        })))
        .unwrap();
        let blob = payload.into_blob_data().unwrap().into_blob().unwrap();
        assert_eq!(blob.blob_type(), BlobType::Code);
        assert_eq!(
            Blob::code("fn main() {}", Some("rust".into())).content(),
            blob.content()
        );
    }

    #[test]
    fn blob_payload_with_unknown_type_fails() {
        let payload = unpack(br#"{"status":0,"data":{"blob_type":"unknown","blob_data":{}}}"#)
            .unwrap();
        let err = payload.into_blob_data().unwrap().into_blob().unwrap_err();
        assert_eq!(err, ProtocolError::UnknownBlobType("unknown".into()));
    }
}
