//! One object cache per endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use sui_mirror_transport::RemoteDataSource;

use crate::cache::{ObjectCache, RefreshPolicy};

/// Maps an endpoint key to its [`ObjectCache`].
///
/// Owned by the application and passed to whatever needs shared caches. Entries are
/// never removed; there is one per network the process talks to.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    instances: Mutex<HashMap<String, Arc<ObjectCache>>>,
    policy: RefreshPolicy,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches created by this registry use `policy`.
    pub fn with_policy(policy: RefreshPolicy) -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// The cache for `endpoint_key`, created on first use with `source`.
    ///
    /// Later calls with the same key return the same cache and ignore `source`.
    pub fn instance_for(
        &self,
        endpoint_key: &str,
        source: Arc<dyn RemoteDataSource>,
    ) -> Arc<ObjectCache> {
        let mut instances = self.instances.lock();
        instances
            .entry(endpoint_key.to_string())
            .or_insert_with(|| {
                debug!(endpoint = endpoint_key, "creating object cache");
                Arc::new(ObjectCache::with_policy(source, self.policy))
            })
            .clone()
    }

    /// [`CacheRegistry::instance_for`] keyed by the source's endpoint.
    pub fn instance_for_source(&self, source: Arc<dyn RemoteDataSource>) -> Arc<ObjectCache> {
        let key = source.endpoint().to_string();
        self.instance_for(&key, source)
    }

    pub fn get(&self, endpoint_key: &str) -> Option<Arc<ObjectCache>> {
        self.instances.lock().get(endpoint_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.instances.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}
