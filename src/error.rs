//! Errors surfaced by the mirror.

use sui_mirror_types::InvalidIdentity;

/// Errors from cache, tracked-object and cursor operations.
///
/// Batch failures inside `ObjectCache::refresh_all` never become a `MirrorError`;
/// they are logged and counted in the refresh report.
#[derive(Debug)]
pub enum MirrorError {
    /// An identifier could not be normalized.
    InvalidIdentity(InvalidIdentity),

    /// An object was pushed into the cache without an id.
    MissingIdentity,

    /// A payload for one object was offered to a different tracked object.
    IdentityMismatch {
        /// Normalized id of the tracked object.
        tracked: String,
        /// Normalized id carried by the payload.
        incoming: String,
    },

    /// The remote data source failed.
    Remote {
        /// What was being attempted, e.g. `suix_queryEvents`.
        operation: String,
        source: anyhow::Error,
    },

    /// A `PagedCursor::for_each` callback returned an error.
    Callback(anyhow::Error),
}

impl MirrorError {
    pub fn remote(operation: impl Into<String>, source: anyhow::Error) -> Self {
        MirrorError::Remote {
            operation: operation.into(),
            source,
        }
    }
}

impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorError::InvalidIdentity(err) => write!(f, "{}", err),
            MirrorError::MissingIdentity => write!(f, "tracked object has no id"),
            MirrorError::IdentityMismatch { tracked, incoming } => write!(
                f,
                "identity mismatch: payload for {} offered to tracked object {}",
                incoming, tracked
            ),
            MirrorError::Remote { operation, source } => {
                write!(f, "remote data source failed during {}: {:#}", operation, source)
            }
            MirrorError::Callback(err) => write!(f, "row callback failed: {:#}", err),
        }
    }
}

impl std::error::Error for MirrorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MirrorError::InvalidIdentity(err) => Some(err),
            MirrorError::Remote { source, .. } => Some(&**source),
            MirrorError::Callback(err) => Some(&**err),
            MirrorError::IdentityMismatch { .. } | MirrorError::MissingIdentity => None,
        }
    }
}

impl From<InvalidIdentity> for MirrorError {
    fn from(err: InvalidIdentity) -> Self {
        MirrorError::InvalidIdentity(err)
    }
}

pub type Result<T, E = MirrorError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use sui_mirror_types::normalize_id;

    #[test]
    fn test_invalid_identity_converts() {
        let err: MirrorError = normalize_id("0xnothex").unwrap_err().into();
        assert!(matches!(err, MirrorError::InvalidIdentity(_)));
        assert!(err.to_string().contains("0xnothex"));
    }

    #[test]
    fn test_remote_error_keeps_source() {
        let err = MirrorError::remote("suix_queryEvents", anyhow::anyhow!("connection reset"));
        let msg = err.to_string();
        assert!(msg.contains("suix_queryEvents"));
        assert!(msg.contains("connection reset"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
