//! Object ownership as reported by the node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::normalize_id_checked;

/// Who owns an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Owner {
    /// Owned by an account address (normalized).
    AddressOwned(String),
    /// Owned by another object, e.g. a dynamic field child (parent id normalized).
    ObjectOwned(String),
    Shared {
        initial_version: u64,
    },
    Immutable,
    #[default]
    Unknown,
}

impl Owner {
    /// Map the JSON-RPC owner descriptor onto an [`Owner`].
    ///
    /// Accepted shapes:
    /// - `{"AddressOwner": "0x.."}`
    /// - `{"ObjectOwner": "0x.."}`
    /// - `{"Shared": {"initial_shared_version": 5}}`
    /// - `{"ConsensusAddressOwner": {"owner": "0x..", ..}}`
    /// - `"Immutable"`
    ///
    /// Anything else maps to [`Owner::Unknown`].
    pub fn from_wire(owner: Option<&Value>) -> Self {
        let Some(owner) = owner else {
            return Owner::Unknown;
        };

        if owner.as_str() == Some("Immutable") {
            return Owner::Immutable;
        }

        let address_of = |v: Option<&Value>| {
            v.and_then(|a| a.as_str())
                .map(|a| normalize_id_checked(a).unwrap_or_else(|| a.to_string()))
        };

        if let Some(addr) = address_of(owner.get("AddressOwner")) {
            return Owner::AddressOwned(addr);
        }
        if let Some(addr) = address_of(owner.get("ConsensusAddressOwner").and_then(|c| c.get("owner"))) {
            return Owner::AddressOwned(addr);
        }
        if let Some(parent) = address_of(owner.get("ObjectOwner")) {
            return Owner::ObjectOwned(parent);
        }
        if let Some(shared) = owner.get("Shared") {
            let initial_version = shared
                .get("initial_shared_version")
                .and_then(crate::payload::version_from_value)
                .unwrap_or(0);
            return Owner::Shared { initial_version };
        }

        Owner::Unknown
    }

    /// Address of the owning account, if any.
    pub fn address(&self) -> Option<&str> {
        match self {
            Owner::AddressOwned(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }

    pub fn is_immutable(&self) -> bool {
        matches!(self, Owner::Immutable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_owner_is_normalized() {
        let owner = Owner::from_wire(Some(&json!({ "AddressOwner": "0xABC" })));
        assert_eq!(
            owner,
            Owner::AddressOwned(
                "0x0000000000000000000000000000000000000000000000000000000000000abc".into()
            )
        );
        assert!(owner.address().is_some());
    }

    #[test]
    fn test_shared_and_immutable() {
        let shared = Owner::from_wire(Some(&json!({ "Shared": { "initial_shared_version": 12 } })));
        assert_eq!(shared, Owner::Shared { initial_version: 12 });
        assert!(shared.is_shared());

        let shared_str =
            Owner::from_wire(Some(&json!({ "Shared": { "initial_shared_version": "7" } })));
        assert_eq!(shared_str, Owner::Shared { initial_version: 7 });

        let immutable = Owner::from_wire(Some(&json!("Immutable")));
        assert!(immutable.is_immutable());
    }

    #[test]
    fn test_object_owner_and_unknown() {
        let child = Owner::from_wire(Some(&json!({ "ObjectOwner": "0x5" })));
        assert!(matches!(child, Owner::ObjectOwned(_)));

        assert_eq!(Owner::from_wire(None), Owner::Unknown);
        assert_eq!(Owner::from_wire(Some(&json!({ "Mystery": 1 }))), Owner::Unknown);
    }

    #[test]
    fn test_consensus_address_owner() {
        let owner = Owner::from_wire(Some(&json!({
            "ConsensusAddressOwner": { "owner": "0x7", "start_version": 3 }
        })));
        assert_eq!(owner.address(), normalize_id_checked("0x7").as_deref());
    }
}
