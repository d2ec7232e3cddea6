//! Local mirror of one on-chain object.
//!
//! A [`TrackedObject`] only changes through [`TrackedObject::absorb`] (authoritative
//! payloads from the node) and [`TrackedObject::mark_deleted`]. It never performs I/O;
//! fetching is the cache's job.
//!
//! Objects shared through the cache live behind an [`ObjectHandle`], so every consumer
//! holding the handle sees the same state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use sui_mirror_types::{normalize_id, normalize_id_checked, short_type_name, InvalidIdentity};
use sui_mirror_types::{ObjectPayload, Owner};

use crate::error::{MirrorError, Result};

/// Key of the object's own UID inside Move content; never copied into `fields`.
const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedObject {
    id: Option<String>,
    normalized_id: Option<String>,
    version: Option<u64>,
    type_tag: Option<String>,
    fields: Map<String, Value>,
    display: BTreeMap<String, String>,
    owner: Owner,
    is_deleted: bool,
    constructed_at: DateTime<Utc>,
    local_properties: Map<String, Value>,
}

impl TrackedObject {
    /// An object with an optional identity and no state yet.
    pub fn new(id: Option<&str>) -> Result<Self, InvalidIdentity> {
        let normalized_id = id.map(normalize_id).transpose()?;
        Ok(Self {
            id: id.map(|s| s.trim().to_string()),
            normalized_id,
            version: None,
            type_tag: None,
            fields: Map::new(),
            display: BTreeMap::new(),
            owner: Owner::Unknown,
            is_deleted: false,
            constructed_at: Utc::now(),
            local_properties: Map::new(),
        })
    }

    /// Construct from a payload, adopting its identity.
    pub fn from_payload(payload: &ObjectPayload) -> Result<Self> {
        let mut object = Self::new(None)?;
        object.absorb(payload)?;
        Ok(object)
    }

    /// Merge an authoritative payload into this object.
    ///
    /// The payload's id is adopted when this object has none; a payload for a
    /// different object fails with [`MirrorError::IdentityMismatch`] and leaves the
    /// object untouched.
    pub fn absorb(&mut self, payload: &ObjectPayload) -> Result<()> {
        if let Some(incoming) = payload.object_id() {
            let incoming_normalized = normalize_id(incoming)?;
            match &self.normalized_id {
                None => {
                    self.id = Some(incoming.trim().to_string());
                    self.normalized_id = Some(incoming_normalized);
                }
                Some(tracked) if *tracked != incoming_normalized => {
                    return Err(MirrorError::IdentityMismatch {
                        tracked: tracked.clone(),
                        incoming: incoming_normalized,
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(version) = payload.version() {
            if let Some(current) = self.version.filter(|current| version < *current) {
                debug!(
                    id = self.normalized_id.as_deref().unwrap_or("<unset>"),
                    current, version, "absorbing an older version"
                );
            }
            self.version = Some(version);
        }

        if payload.is_deletion() {
            self.mark_deleted();
            return Ok(());
        }

        if let Some(type_tag) = payload.type_tag() {
            self.type_tag = Some(type_tag.to_string());
        }
        if let Some(fields) = payload.fields() {
            for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != ID_FIELD) {
                self.fields.insert(key.clone(), value.clone());
            }
        }
        if let Some(display) = payload.display() {
            for (key, value) in display {
                match value {
                    Value::Null => {}
                    Value::String(s) => {
                        self.display.insert(key.clone(), s.clone());
                    }
                    other => {
                        self.display.insert(key.clone(), other.to_string());
                    }
                }
            }
        }
        if let Some(owner) = payload.owner() {
            self.owner = Owner::from_wire(Some(owner));
        }
        Ok(())
    }

    /// Mark as deleted. Returns true when this call made the transition.
    pub fn mark_deleted(&mut self) -> bool {
        let transitioned = !self.is_deleted;
        self.is_deleted = true;
        transitioned
    }

    /// True iff address-owned by `address` (compared after normalization).
    pub fn is_owned_by(&self, address: &str) -> bool {
        match (self.owner.address(), normalize_id_checked(address)) {
            (Some(owner), Some(address)) => owner == address,
            _ => false,
        }
    }

    /// Whether `id` names this object.
    pub fn id_equals(&self, id: &str) -> bool {
        match (&self.normalized_id, normalize_id_checked(id)) {
            (Some(tracked), Some(other)) => *tracked == other,
            _ => false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn normalized_id(&self) -> Option<&str> {
        self.normalized_id.as_deref()
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Short struct name of the type, e.g. `Coin` for `0x2::coin::Coin<0x2::sui::SUI>`.
    pub fn type_name(&self) -> Option<&str> {
        self.type_tag.as_deref().map(short_type_name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn display(&self) -> &BTreeMap<String, String> {
        &self.display
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn is_shared(&self) -> bool {
        self.owner.is_shared()
    }

    pub fn is_immutable(&self) -> bool {
        self.owner.is_immutable()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn constructed_at(&self) -> DateTime<Utc> {
        self.constructed_at
    }

    /// Caller-owned scratch values. Never sent anywhere and never merged into `fields`.
    pub fn local_properties(&self) -> &Map<String, Value> {
        &self.local_properties
    }

    pub fn local_property(&self, key: &str) -> Option<&Value> {
        self.local_properties.get(key)
    }

    pub fn set_local_property(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.local_properties.insert(key.into(), value)
    }
}

/// Shared handle to a tracked object.
///
/// Cloning the handle shares the object. Identity is pointer identity, see
/// [`ObjectHandle::ptr_eq`].
#[derive(Clone)]
pub struct ObjectHandle(Arc<RwLock<TrackedObject>>);

impl ObjectHandle {
    pub fn new(object: TrackedObject) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TrackedObject> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TrackedObject> {
        self.0.write()
    }

    /// Whether both handles point at the same tracked object.
    pub fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn normalized_id(&self) -> Option<String> {
        self.read().normalized_id.clone()
    }

    pub fn version(&self) -> Option<u64> {
        self.read().version
    }

    pub fn is_deleted(&self) -> bool {
        self.read().is_deleted
    }

    pub fn absorb(&self, payload: &ObjectPayload) -> Result<()> {
        self.write().absorb(payload)
    }

    pub fn mark_deleted(&self) -> bool {
        self.write().mark_deleted()
    }

    /// Point-in-time copy of the object.
    pub fn snapshot(&self) -> TrackedObject {
        self.read().clone()
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectHandle").field(&*self.read()).finish()
    }
}

impl From<TrackedObject> for ObjectHandle {
    fn from(object: TrackedObject) -> Self {
        ObjectHandle::new(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sui_mirror_types::{ObjectChange, ObjectData};

    fn hero(id: &str, version: u64, hp: u64) -> ObjectPayload {
        let mut fields = Map::new();
        fields.insert("id".into(), json!({ "id": id }));
        fields.insert("hp".into(), json!(hp));
        ObjectData::new(id)
            .with_version(version)
            .with_type("0xabc::game::Hero")
            .with_owner(json!({ "AddressOwner": "0xB0B" }))
            .with_fields(fields)
            .into()
    }

    #[test]
    fn test_new_normalizes_id() {
        let object = TrackedObject::new(Some("0X2")).unwrap();
        assert_eq!(object.id(), Some("0X2"));
        assert_eq!(
            object.normalized_id(),
            Some("0x0000000000000000000000000000000000000000000000000000000000000002")
        );
        assert!(TrackedObject::new(Some("zz")).is_err());
    }

    #[test]
    fn test_from_payload_adopts_identity_and_state() {
        let object = TrackedObject::from_payload(&hero("0x5", 3, 100)).unwrap();
        assert!(object.id_equals("5"));
        assert_eq!(object.version(), Some(3));
        assert_eq!(object.type_name(), Some("Hero"));
        assert_eq!(object.field("hp"), Some(&json!(100)));
        assert!(object.field("id").is_none());
        assert!(object.is_owned_by("0xb0b"));
        assert!(!object.is_owned_by("0xdead"));
    }

    #[test]
    fn test_absorb_foreign_payload_fails() {
        let mut object = TrackedObject::new(Some("0x5")).unwrap();
        let err = object.absorb(&hero("0x6", 1, 1)).unwrap_err();
        assert!(matches!(err, MirrorError::IdentityMismatch { .. }));
        assert!(object.version().is_none());
    }

    #[test]
    fn test_absorb_merges_fields_and_last_write_wins() {
        let mut object = TrackedObject::from_payload(&hero("0x5", 7, 100)).unwrap();
        let mut extra = Map::new();
        extra.insert("mana".into(), json!(5));
        object
            .absorb(&ObjectData::new("0x5").with_version(4).with_fields(extra).into())
            .unwrap();
        assert_eq!(object.version(), Some(4));
        assert_eq!(object.field("hp"), Some(&json!(100)));
        assert_eq!(object.field("mana"), Some(&json!(5)));
        // owner missing from the payload keeps the old owner
        assert!(object.is_owned_by("0xb0b"));
    }

    #[test]
    fn test_deletion_is_sticky() {
        let mut object = TrackedObject::from_payload(&hero("0x5", 1, 1)).unwrap();
        object
            .absorb(&ObjectPayload::Deleted {
                object_id: "0x5".into(),
                version: Some(2),
            })
            .unwrap();
        assert!(object.is_deleted());

        object.absorb(&hero("0x5", 3, 50)).unwrap();
        assert!(object.is_deleted());
        assert!(!object.mark_deleted());
    }

    #[test]
    fn test_absorb_object_change() {
        let change: ObjectChange = serde_json::from_value(json!({
            "type": "transferred",
            "objectId": "0x5",
            "objectType": "0xabc::game::Hero",
            "version": "9",
            "recipient": { "AddressOwner": "0xa11ce" }
        }))
        .unwrap();
        let mut object = TrackedObject::from_payload(&hero("0x5", 1, 1)).unwrap();
        object.absorb(&change.into()).unwrap();
        assert_eq!(object.version(), Some(9));
        assert!(object.is_owned_by("0xA11CE"));
    }

    #[test]
    fn test_display_values_are_strings() {
        let mut display = Map::new();
        display.insert("name".into(), json!("Hero #1"));
        display.insert("level".into(), json!(3));
        display.insert("missing".into(), Value::Null);
        let object =
            TrackedObject::from_payload(&ObjectData::new("0x1").with_display(display).into())
                .unwrap();
        assert_eq!(object.display().get("name").map(String::as_str), Some("Hero #1"));
        assert_eq!(object.display().get("level").map(String::as_str), Some("3"));
        assert!(!object.display().contains_key("missing"));
    }

    #[test]
    fn test_local_properties_do_not_touch_fields() {
        let mut object = TrackedObject::from_payload(&hero("0x5", 1, 1)).unwrap();
        object.set_local_property("hp", json!("local"));
        assert_eq!(object.field("hp"), Some(&json!(1)));
        assert_eq!(object.local_property("hp"), Some(&json!("local")));
    }

    #[test]
    fn test_handle_identity() {
        let a = ObjectHandle::new(TrackedObject::new(Some("0x1")).unwrap());
        let b = a.clone();
        let c = ObjectHandle::new(TrackedObject::new(Some("0x1")).unwrap());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        b.mark_deleted();
        assert!(a.is_deleted());
    }
}
