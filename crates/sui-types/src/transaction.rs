//! Transaction responses and events as returned by the node.
//!
//! These are plain wire types; the root crate wraps them in `TransactionOutcome`
//! and `ChainEvent`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{de_opt_version, ObjectChange};

/// A transaction block as returned by execution or `suix_queryTransactionBlocks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockResponse {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub object_changes: Option<Vec<ObjectChange>>,
    #[serde(default)]
    pub events: Option<Vec<EventEnvelope>>,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub timestamp_ms: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub checkpoint: Option<u64>,
}

/// The subset of transaction effects the mirror cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub mutated: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub deleted: Vec<ObjectRef>,
    #[serde(default)]
    pub wrapped: Vec<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub const SUCCESS: &'static str = "success";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedObjectRef {
    #[serde(default)]
    pub owner: Option<Value>,
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub version: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// An emitted Move event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub id: EventId,
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub transaction_module: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Option<Value>,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub timestamp_ms: Option<u64>,
}

/// Event identity; also the cursor shape of `suix_queryEvents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub event_seq: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_response_parses() {
        let response: TransactionBlockResponse = serde_json::from_value(json!({
            "digest": "9V3x",
            "timestampMs": "1700000000000",
            "checkpoint": "12",
            "effects": {
                "messageVersion": "v1",
                "status": { "status": "success" },
                "created": [
                    { "owner": { "AddressOwner": "0x1" }, "reference": { "objectId": "0x10", "version": 2, "digest": "a" } }
                ],
                "mutated": [],
                "deleted": [ { "objectId": "0x11", "version": 2, "digest": "b" } ]
            },
            "objectChanges": [
                { "type": "created", "objectId": "0x10", "objectType": "0xabc::m::T", "version": "2", "owner": { "AddressOwner": "0x1" } }
            ],
            "events": [
                {
                    "id": { "txDigest": "9V3x", "eventSeq": "0" },
                    "packageId": "0xabc",
                    "transactionModule": "m",
                    "sender": "0x1",
                    "type": "0xabc::m::Minted<u64>",
                    "parsedJson": { "amount": "5" },
                    "timestampMs": "1700000000000"
                }
            ]
        }))
        .unwrap();

        let effects = response.effects.as_ref().unwrap();
        assert!(effects.status.is_success());
        assert_eq!(effects.created[0].reference.version, Some(2));
        assert_eq!(effects.deleted[0].object_id, "0x11");
        assert_eq!(response.timestamp_ms, Some(1_700_000_000_000));
        assert_eq!(response.checkpoint, Some(12));

        let events = response.events.as_ref().unwrap();
        assert_eq!(events[0].id.event_seq, Some(0));
        assert_eq!(events[0].event_type, "0xabc::m::Minted<u64>");
    }

    #[test]
    fn test_failed_status() {
        let status: ExecutionStatus =
            serde_json::from_value(json!({ "status": "failure", "error": "MoveAbort" })).unwrap();
        assert!(!status.is_success());
        assert_eq!(status.error.as_deref(), Some("MoveAbort"));
    }
}
