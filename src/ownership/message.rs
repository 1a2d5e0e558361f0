//=========================================================================
// Ownership Wire Codec
//=========================================================================
//
// The broadcast message exchanged between tabs on the ownership channel.
//
// Wire shape (JSON): {"type": "...", "tabId": "...", "timestamp": n}
//
// Delivery is fire-and-forget: duplicates and self-receipt must be
// tolerated by consumers. Unknown `type` values decode to
// `MessageKind::Unknown` and are ignored; malformed payloads decode to
// `None` and are dropped. The timestamp is informational only.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{SystemTime, UNIX_EPOCH};

use log::trace;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::tab_id::TabId;

//=== MessageKind =========================================================

/// Tag of an [`OwnershipMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A visible tab asks to become owner.
    RequestOwnership,

    /// Ownership is granted to the tab named in `tab_id`.
    OwnershipGranted,

    /// The sender gives up ownership.
    Relinquish,

    /// Any unrecognized tag; ignored without error.
    #[serde(other)]
    Unknown,
}

//=== OwnershipMessage ====================================================

/// One broadcast on the ownership channel.
///
/// `tab_id` names the sender, except for [`MessageKind::OwnershipGranted`]
/// where it names the grantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    #[serde(rename = "tabId")]
    pub tab_id: TabId,

    /// Milliseconds since the Unix epoch at send time; informational,
    /// never drives protocol logic.
    pub timestamp: u64,
}

impl OwnershipMessage {
    /// Builds a message stamped with the current wall-clock time.
    pub fn new(kind: MessageKind, tab_id: TabId) -> Self {
        Self {
            kind,
            tab_id,
            timestamp: now_millis(),
        }
    }

    /// Serializes to the JSON wire shape.
    pub fn encode(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(payload) => Some(payload),
            Err(err) => {
                trace!(target: "governor::ownership", "failed to encode message: {}", err);
                None
            }
        }
    }

    /// Parses a payload from the wire; `None` for malformed input.
    pub fn decode(payload: &str) -> Option<Self> {
        match serde_json::from_str(payload) {
            Ok(message) => Some(message),
            Err(err) => {
                trace!(target: "governor::ownership", "dropping malformed payload: {}", err);
                None
            }
        }
    }
}

//=== Helpers =============================================================

/// Milliseconds since the Unix epoch; 0 if the clock predates it.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn encodes_the_expected_wire_shape() {
        let message = OwnershipMessage::new(MessageKind::RequestOwnership, TabId::from("tab-1-a"));

        let value: Value = serde_json::from_str(&message.encode().unwrap()).unwrap();

        assert_eq!(value["type"], "request_ownership");
        assert_eq!(value["tabId"], "tab-1-a");
        assert!(value["timestamp"].is_u64());
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn decodes_snake_case_kinds() {
        for (wire, kind) in [
            ("request_ownership", MessageKind::RequestOwnership),
            ("ownership_granted", MessageKind::OwnershipGranted),
            ("relinquish", MessageKind::Relinquish),
        ] {
            let payload = format!(r#"{{"type":"{}","tabId":"t","timestamp":1}}"#, wire);
            let message = OwnershipMessage::decode(&payload).unwrap();
            assert_eq!(message.kind, kind);
        }
    }

    #[test]
    fn unknown_kind_decodes_to_unknown() {
        let payload = r#"{"type":"jackpot","tabId":"t","timestamp":1}"#;

        let message = OwnershipMessage::decode(payload).unwrap();

        assert_eq!(message.kind, MessageKind::Unknown);
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let payload = r#"{"type":"relinquish","tabId":"t","timestamp":1,"origin":"x"}"#;

        let message = OwnershipMessage::decode(payload).unwrap();

        assert_eq!(message.kind, MessageKind::Relinquish);
        assert_eq!(message.tab_id, TabId::from("t"));
    }

    #[test]
    fn malformed_payloads_decode_to_none() {
        assert!(OwnershipMessage::decode("").is_none());
        assert!(OwnershipMessage::decode("not json").is_none());
        assert!(OwnershipMessage::decode(r#"{"type":"relinquish"}"#).is_none());
        assert!(OwnershipMessage::decode(r#"{"tabId":"t","timestamp":1}"#).is_none());
    }

    #[test]
    fn round_trip_preserves_the_message() {
        let message = OwnershipMessage::new(MessageKind::OwnershipGranted, TabId::from("tab-2-b"));

        let back = OwnershipMessage::decode(&message.encode().unwrap()).unwrap();

        assert_eq!(back, message);
    }

    #[test]
    fn timestamps_are_recent_unix_millis() {
        // 2020-01-01 in millis; catches seconds/millis mixups.
        assert!(now_millis() > 1_577_836_800_000);
    }
}
