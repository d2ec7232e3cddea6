//! Object payloads as returned by the node.
//!
//! Two wire shapes carry object state:
//! - [`ObjectData`] from `sui_getObject` / `sui_multiGetObjects` / owned-object pages
//! - [`ObjectChange`] entries from a transaction response's `objectChanges`
//!
//! [`ObjectPayload`] unifies them behind explicit accessors so that absorbing a
//! payload into a tracked object never depends on ad-hoc key lookups.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parse a version/sequence number that the node may render as a number or a string.
pub fn version_from_value(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

pub(crate) fn de_opt_version<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(version_from_value))
}

/// Which parts of an object the node should include in a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    pub show_type: bool,
    pub show_owner: bool,
    pub show_previous_transaction: bool,
    pub show_display: bool,
    pub show_content: bool,
    pub show_bcs: bool,
    pub show_storage_rebate: bool,
}

impl ObjectDataOptions {
    /// Type, owner, content and display: everything a tracked object absorbs.
    pub fn full() -> Self {
        Self {
            show_type: true,
            show_owner: true,
            show_content: true,
            show_display: true,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, show_display: bool) -> Self {
        self.show_display = show_display;
        self
    }
}

/// Object state from an object read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: String,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub version: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(default)]
    pub previous_transaction: Option<String>,
    #[serde(default)]
    pub content: Option<ObjectContent>,
    #[serde(default)]
    pub display: Option<DisplayData>,
}

impl ObjectData {
    /// Minimal object data, mostly useful for building fixtures.
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            version: None,
            digest: None,
            type_tag: None,
            owner: None,
            previous_transaction: None,
            content: None,
            display: None,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn with_owner(mut self, owner: Value) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        let content = self.content.get_or_insert_with(ObjectContent::default);
        content.fields = fields;
        self
    }

    pub fn with_display(mut self, display: Map<String, Value>) -> Self {
        self.display = Some(DisplayData {
            data: Some(display),
            error: None,
        });
        self
    }
}

/// Move content of an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub has_public_transfer: Option<bool>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Display metadata (`0x2::display`) rendered by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Error entry of an object read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectResponseError {
    pub code: String,
    #[serde(default, alias = "objectId")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub version: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl ObjectResponseError {
    pub const DELETED: &'static str = "deleted";
    pub const NOT_EXISTS: &'static str = "notExists";

    pub fn deleted(object_id: impl Into<String>) -> Self {
        Self {
            code: Self::DELETED.to_string(),
            object_id: Some(object_id.into()),
            version: None,
            digest: None,
        }
    }

    pub fn not_exists(object_id: impl Into<String>) -> Self {
        Self {
            code: Self::NOT_EXISTS.to_string(),
            object_id: Some(object_id.into()),
            version: None,
            digest: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.code == Self::DELETED
    }
}

/// One entry of an object read: either data or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<ObjectResponseError>,
}

impl ObjectResponse {
    pub fn found(data: ObjectData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: ObjectResponseError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Id this entry is about, from either branch.
    pub fn object_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.object_id.as_str())
            .or_else(|| self.error.as_ref().and_then(|e| e.object_id.as_deref()))
    }

    pub fn is_deleted(&self) -> bool {
        self.error.as_ref().is_some_and(ObjectResponseError::is_deleted)
    }
}

/// Result of `sui_tryGetPastObject`.
///
/// Only `VersionFound` carries object data; the other statuses keep the node's
/// details as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "details")]
pub enum PastObjectResponse {
    VersionFound(ObjectData),
    ObjectNotExists(Value),
    ObjectDeleted(Value),
    VersionNotFound(Value),
    VersionTooHigh(Value),
}

impl PastObjectResponse {
    pub fn data(&self) -> Option<&ObjectData> {
        match self {
            PastObjectResponse::VersionFound(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<ObjectData> {
        match self {
            PastObjectResponse::VersionFound(data) => Some(data),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            PastObjectResponse::VersionFound(_) => "VersionFound",
            PastObjectResponse::ObjectNotExists(_) => "ObjectNotExists",
            PastObjectResponse::ObjectDeleted(_) => "ObjectDeleted",
            PastObjectResponse::VersionNotFound(_) => "VersionNotFound",
            PastObjectResponse::VersionTooHigh(_) => "VersionTooHigh",
        }
    }
}

/// An entry of a transaction response's `objectChanges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ObjectChange {
    Created {
        object_id: String,
        #[serde(default)]
        object_type: Option<String>,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default)]
        owner: Option<Value>,
        #[serde(default)]
        digest: Option<String>,
        #[serde(default)]
        sender: Option<String>,
    },
    Mutated {
        object_id: String,
        #[serde(default)]
        object_type: Option<String>,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default, deserialize_with = "de_opt_version")]
        previous_version: Option<u64>,
        #[serde(default)]
        owner: Option<Value>,
        #[serde(default)]
        digest: Option<String>,
        #[serde(default)]
        sender: Option<String>,
    },
    Transferred {
        object_id: String,
        #[serde(default)]
        object_type: Option<String>,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default)]
        recipient: Option<Value>,
        #[serde(default)]
        digest: Option<String>,
        #[serde(default)]
        sender: Option<String>,
    },
    Deleted {
        object_id: String,
        #[serde(default)]
        object_type: Option<String>,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default)]
        sender: Option<String>,
    },
    Wrapped {
        object_id: String,
        #[serde(default)]
        object_type: Option<String>,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default)]
        sender: Option<String>,
    },
    Published {
        package_id: String,
        #[serde(default, deserialize_with = "de_opt_version")]
        version: Option<u64>,
        #[serde(default)]
        digest: Option<String>,
        #[serde(default)]
        modules: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ObjectChange {
    pub fn object_id(&self) -> Option<&str> {
        match self {
            ObjectChange::Created { object_id, .. }
            | ObjectChange::Mutated { object_id, .. }
            | ObjectChange::Transferred { object_id, .. }
            | ObjectChange::Deleted { object_id, .. }
            | ObjectChange::Wrapped { object_id, .. } => Some(object_id),
            ObjectChange::Published { package_id, .. } => Some(package_id),
            ObjectChange::Unknown => None,
        }
    }

    pub fn object_type(&self) -> Option<&str> {
        match self {
            ObjectChange::Created { object_type, .. }
            | ObjectChange::Mutated { object_type, .. }
            | ObjectChange::Transferred { object_type, .. }
            | ObjectChange::Deleted { object_type, .. }
            | ObjectChange::Wrapped { object_type, .. } => object_type.as_deref(),
            ObjectChange::Published { .. } | ObjectChange::Unknown => None,
        }
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            ObjectChange::Created { version, .. }
            | ObjectChange::Mutated { version, .. }
            | ObjectChange::Transferred { version, .. }
            | ObjectChange::Deleted { version, .. }
            | ObjectChange::Wrapped { version, .. }
            | ObjectChange::Published { version, .. } => *version,
            ObjectChange::Unknown => None,
        }
    }

    /// Owner after the change; a transfer reports it as the recipient.
    pub fn owner(&self) -> Option<&Value> {
        match self {
            ObjectChange::Created { owner, .. } | ObjectChange::Mutated { owner, .. } => {
                owner.as_ref()
            }
            ObjectChange::Transferred { recipient, .. } => recipient.as_ref(),
            _ => None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, ObjectChange::Deleted { .. })
    }
}

/// Anything a tracked object can absorb.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPayload {
    /// Authoritative state from an object read.
    Data(ObjectData),
    /// A change reported by a transaction.
    Change(ObjectChange),
    /// The node reported the object as deleted.
    Deleted {
        object_id: String,
        version: Option<u64>,
    },
}

impl ObjectPayload {
    pub fn object_id(&self) -> Option<&str> {
        match self {
            ObjectPayload::Data(data) => Some(&data.object_id),
            ObjectPayload::Change(change) => change.object_id(),
            ObjectPayload::Deleted { object_id, .. } => Some(object_id),
        }
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            ObjectPayload::Data(data) => data.version,
            ObjectPayload::Change(change) => change.version(),
            ObjectPayload::Deleted { version, .. } => *version,
        }
    }

    pub fn type_tag(&self) -> Option<&str> {
        match self {
            ObjectPayload::Data(data) => data
                .type_tag
                .as_deref()
                .or_else(|| data.content.as_ref().and_then(|c| c.type_tag.as_deref())),
            ObjectPayload::Change(change) => change.object_type(),
            ObjectPayload::Deleted { .. } => None,
        }
    }

    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            ObjectPayload::Data(data) => data.content.as_ref().map(|c| &c.fields),
            _ => None,
        }
    }

    pub fn display(&self) -> Option<&Map<String, Value>> {
        match self {
            ObjectPayload::Data(data) => data.display.as_ref().and_then(|d| d.data.as_ref()),
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<&Value> {
        match self {
            ObjectPayload::Data(data) => data.owner.as_ref(),
            ObjectPayload::Change(change) => change.owner(),
            ObjectPayload::Deleted { .. } => None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        match self {
            ObjectPayload::Data(_) => false,
            ObjectPayload::Change(change) => change.is_deletion(),
            ObjectPayload::Deleted { .. } => true,
        }
    }
}

impl From<ObjectData> for ObjectPayload {
    fn from(data: ObjectData) -> Self {
        ObjectPayload::Data(data)
    }
}

impl From<ObjectChange> for ObjectPayload {
    fn from(change: ObjectChange) -> Self {
        ObjectPayload::Change(change)
    }
}

/// Row of a `suix_getDynamicFields` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    #[serde(default)]
    pub bcs_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    pub object_id: String,
    #[serde(default, deserialize_with = "de_opt_version")]
    pub version: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub value: Value,
}
