//! Object and account identity normalization.
//!
//! This module is the canonical source for identity normalization in the workspace.
//! Every cache key, equality check and ownership test goes through [`normalize_id`].
//!
//! Sui identifiers are 32-byte values, but they're often represented in different formats:
//! - Short form: "0x2"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000002"
//! - Without prefix: "2"
//! - Mixed case: "0X0aBc"
//!
//! All of them normalize to the lowercase, zero-padded, `0x`-prefixed full form.

use std::fmt;

/// Number of bytes in an object id or account address.
pub const ID_LENGTH: usize = 32;

/// Number of hex digits in the canonical form (without the prefix).
const ID_HEX_LENGTH: usize = ID_LENGTH * 2;

/// Input could not be coerced into a 32-byte identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentity {
    /// The input exactly as it was supplied.
    pub input: String,
    /// Why the input was rejected.
    pub reason: &'static str,
}

impl fmt::Display for InvalidIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identity '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for InvalidIdentity {}

/// Normalize an identifier to lowercase with 0x prefix and full 64 hex characters.
///
/// Fails when the input is empty, contains non-hex characters, or is longer than
/// 32 bytes.
///
/// # Examples
///
/// ```
/// use sui_mirror_types::address::normalize_id;
///
/// let full = "0x0000000000000000000000000000000000000000000000000000000000000002";
/// assert_eq!(normalize_id("0x2").unwrap(), full);
/// assert_eq!(normalize_id("0X02").unwrap(), full);
/// assert_eq!(normalize_id("2").unwrap(), full);
/// assert!(normalize_id("not-hex").is_err());
/// ```
pub fn normalize_id(id: &str) -> Result<String, InvalidIdentity> {
    let invalid = |reason| InvalidIdentity {
        input: id.to_string(),
        reason,
    };

    let trimmed = id.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex_part.is_empty() {
        return Err(invalid("empty identifier"));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters"));
    }
    if hex_part.len() > ID_HEX_LENGTH {
        return Err(invalid("longer than 32 bytes"));
    }

    let padded = format!("{:0>width$}", hex_part.to_ascii_lowercase(), width = ID_HEX_LENGTH);
    // Round-trip through bytes so only well-formed 32-byte values get through.
    let bytes = hex::decode(&padded).map_err(|_| invalid("not decodable as hex"))?;
    if bytes.len() != ID_LENGTH {
        return Err(invalid("wrong byte length"));
    }

    Ok(format!("0x{}", padded))
}

/// Normalize an identifier, returning None if it's not a valid identity.
pub fn normalize_id_checked(id: &str) -> Option<String> {
    normalize_id(id).ok()
}

/// Normalize an identifier to short form (minimal hex digits).
///
/// Used for display only; never use the short form as a key.
///
/// # Examples
///
/// ```
/// use sui_mirror_types::address::normalize_id_short;
///
/// assert_eq!(normalize_id_short("0x0000000000000000000000000000000000000000000000000000000000000002").unwrap(), "0x2");
/// assert_eq!(normalize_id_short("0x0").unwrap(), "0x0");
/// ```
pub fn normalize_id_short(id: &str) -> Result<String, InvalidIdentity> {
    let normalized = normalize_id(id)?;
    let trimmed = normalized[2..].trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0x0".to_string())
    } else {
        Ok(format!("0x{}", trimmed))
    }
}

/// Compare two identifiers after normalization.
///
/// Invalid inputs never compare equal, not even to themselves.
pub fn ids_equal(a: &str, b: &str) -> bool {
    match (normalize_id(a), normalize_id(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// In-module type name without package/module prefix and without type arguments.
///
/// # Examples
///
/// ```
/// use sui_mirror_types::address::short_type_name;
///
/// assert_eq!(short_type_name("0x2::coin::Coin<0x2::sui::SUI>"), "Coin");
/// assert_eq!(short_type_name("0xabc::game::Hero"), "Hero");
/// ```
pub fn short_type_name(type_tag: &str) -> &str {
    let base = type_tag.split('<').next().unwrap_or(type_tag);
    base.rsplit("::").next().unwrap_or(base)
}
