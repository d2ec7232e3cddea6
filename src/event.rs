//! Move events.

use serde::Serialize;
use serde_json::Value;

use sui_mirror_types::{short_type_name, EventEnvelope, EventId};

/// One emitted Move event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainEvent {
    envelope: EventEnvelope,
}

impl ChainEvent {
    pub fn new(envelope: EventEnvelope) -> Self {
        Self { envelope }
    }

    /// Parse a `suix_queryEvents` row or a transaction's event entry.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value).map(Self::new)
    }

    pub fn id(&self) -> &EventId {
        &self.envelope.id
    }

    /// Full Move type, e.g. `0xabc::game::Minted<u64>`.
    pub fn event_type(&self) -> &str {
        &self.envelope.event_type
    }

    /// Struct name only, e.g. `Minted`.
    pub fn type_name(&self) -> &str {
        short_type_name(&self.envelope.event_type)
    }

    pub fn parsed_json(&self) -> Option<&Value> {
        self.envelope.parsed_json.as_ref()
    }

    pub fn timestamp_ms(&self) -> Option<u64> {
        self.envelope.timestamp_ms
    }

    pub fn sender(&self) -> Option<&str> {
        self.envelope.sender.as_deref()
    }

    pub fn package_id(&self) -> Option<&str> {
        self.envelope.package_id.as_deref()
    }

    /// Module whose function emitted the event.
    pub fn module(&self) -> Option<&str> {
        self.envelope.transaction_module.as_deref()
    }

    pub fn envelope(&self) -> &EventEnvelope {
        &self.envelope
    }
}

impl From<EventEnvelope> for ChainEvent {
    fn from(envelope: EventEnvelope) -> Self {
        Self::new(envelope)
    }
}
