//! Transaction outcomes.

use std::collections::HashMap;

use serde_json::Value;

use sui_mirror_types::{
    normalize_id_checked, ObjectPayload, TransactionBlockResponse,
};

use crate::error::Result;
use crate::event::ChainEvent;
use crate::tracked::TrackedObject;

/// Objects a transaction touched, as standalone tracked objects.
///
/// These are not registered anywhere; use `ObjectCache::apply_transaction` to fold a
/// transaction into a cache.
#[derive(Debug, Clone, Default)]
pub struct TransactionResults {
    pub created: Vec<TrackedObject>,
    pub mutated: Vec<TrackedObject>,
    pub deleted: Vec<TrackedObject>,
    /// Every object seen, in first-seen order.
    pub objects: Vec<TrackedObject>,
}

/// An executed or queried transaction block.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    response: TransactionBlockResponse,
}

impl TransactionOutcome {
    pub fn new(response: TransactionBlockResponse) -> Self {
        Self { response }
    }

    /// Parse a `suix_queryTransactionBlocks` row or an execution response.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value).map(Self::new)
    }

    pub fn digest(&self) -> &str {
        &self.response.digest
    }

    /// Execution status string (`success` / `failure`), when effects were requested.
    pub fn status(&self) -> Option<&str> {
        self.response
            .effects
            .as_ref()
            .map(|effects| effects.status.status.as_str())
    }

    pub fn is_successful(&self) -> bool {
        self.response
            .effects
            .as_ref()
            .is_some_and(|effects| effects.status.is_success())
    }

    pub fn error(&self) -> Option<&str> {
        self.response
            .effects
            .as_ref()
            .and_then(|effects| effects.status.error.as_deref())
    }

    pub fn timestamp_ms(&self) -> Option<u64> {
        self.response.timestamp_ms
    }

    pub fn checkpoint(&self) -> Option<u64> {
        self.response.checkpoint
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.response
            .events
            .iter()
            .flatten()
            .cloned()
            .map(ChainEvent::from)
            .collect()
    }

    pub fn response(&self) -> &TransactionBlockResponse {
        &self.response
    }

    /// Build tracked objects from `objectChanges`, then classify them by effects.
    ///
    /// Created and mutated lists only contain objects that also appear in
    /// `objectChanges`. Deleted effects produce tombstones even without a change entry.
    pub fn results(&self) -> Result<TransactionResults> {
        let mut objects: Vec<TrackedObject> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for change in self.response.object_changes.iter().flatten() {
            let Some(key) = change.object_id().and_then(normalize_id_checked) else {
                continue;
            };
            if index.contains_key(&key) {
                continue;
            }
            let object = TrackedObject::from_payload(&ObjectPayload::Change(change.clone()))?;
            index.insert(key, objects.len());
            objects.push(object);
        }

        let mut results = TransactionResults::default();
        let Some(effects) = self.response.effects.as_ref() else {
            results.objects = objects;
            return Ok(results);
        };

        let lookup = |id: &str| normalize_id_checked(id).and_then(|key| index.get(&key).copied());
        for owned in &effects.created {
            if let Some(i) = lookup(&owned.reference.object_id) {
                results.created.push(objects[i].clone());
            }
        }
        for owned in &effects.mutated {
            if let Some(i) = lookup(&owned.reference.object_id) {
                results.mutated.push(objects[i].clone());
            }
        }

        for reference in &effects.deleted {
            let Some(key) = normalize_id_checked(&reference.object_id) else {
                continue;
            };
            let i = match index.get(&key) {
                Some(i) => *i,
                None => {
                    let object = TrackedObject::from_payload(&ObjectPayload::Deleted {
                        object_id: reference.object_id.clone(),
                        version: reference.version,
                    })?;
                    index.insert(key, objects.len());
                    objects.push(object);
                    objects.len() - 1
                }
            };
            objects[i].mark_deleted();
            results.deleted.push(objects[i].clone());
        }

        results.objects = objects;
        Ok(results)
    }
}

impl From<TransactionBlockResponse> for TransactionOutcome {
    fn from(response: TransactionBlockResponse) -> Self {
        Self::new(response)
    }
}
