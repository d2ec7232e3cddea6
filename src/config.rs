//! Runtime configuration.
//!
//! Environment variables:
//!
//! | Variable                        | Default            |
//! |---------------------------------|--------------------|
//! | `SUI_RPC_URL`                   | mainnet fullnode   |
//! | `SUI_RPC_TIMEOUT_SECS`          | 30                 |
//! | `SUI_RPC_CONNECT_TIMEOUT_SECS`  | 10                 |
//! | `SUI_MIRROR_BATCH_SIZE`         | 50 (max 50)        |
//! | `SUI_MIRROR_PAGE_LIMIT`         | 50 (max 50)        |
//! | `SUI_MIRROR_REFRESH_RETRIES`    | 0                  |
//! | `SUI_MIRROR_INCLUDE_DISPLAY`    | true               |

use std::sync::Arc;
use std::time::Duration;

use sui_mirror_transport::network::{infer_network_from_url, resolve_rpc_endpoint};
use sui_mirror_transport::{JsonRpcClient, RemoteDataSource};
use sui_mirror_types::env_utils::{env_bool_or, env_secs_or, env_var_or};
use sui_mirror_types::{ObjectDataOptions, RetryConfig, MAX_PAGE_SIZE};

use crate::cache::{RefreshPolicy, MAX_BATCH_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub rpc_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub batch_size: usize,
    pub page_limit: usize,
    pub refresh_retries: usize,
    pub include_display: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            rpc_url: resolve_rpc_endpoint(Some("mainnet")),
            timeout: Duration::from_secs(JsonRpcClient::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(JsonRpcClient::DEFAULT_CONNECT_TIMEOUT_SECS),
            batch_size: MAX_BATCH_SIZE,
            page_limit: MAX_PAGE_SIZE,
            refresh_retries: 0,
            include_display: true,
        }
    }
}

impl MirrorConfig {
    pub fn from_env() -> Self {
        Self {
            rpc_url: resolve_rpc_endpoint(None),
            timeout: env_secs_or("SUI_RPC_TIMEOUT_SECS", JsonRpcClient::DEFAULT_TIMEOUT_SECS),
            connect_timeout: env_secs_or(
                "SUI_RPC_CONNECT_TIMEOUT_SECS",
                JsonRpcClient::DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
            batch_size: env_var_or("SUI_MIRROR_BATCH_SIZE", MAX_BATCH_SIZE).clamp(1, MAX_BATCH_SIZE),
            page_limit: env_var_or("SUI_MIRROR_PAGE_LIMIT", MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            refresh_retries: env_var_or("SUI_MIRROR_REFRESH_RETRIES", 0),
            include_display: env_bool_or("SUI_MIRROR_INCLUDE_DISPLAY", true),
        }
    }

    /// Endpoint URL or a network name (`mainnet`, `testnet`, `devnet`, `localnet`).
    pub fn with_rpc_url(mut self, rpc_url: &str) -> Self {
        self.rpc_url = resolve_rpc_endpoint(Some(rpc_url));
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_refresh_retries(mut self, retries: usize) -> Self {
        self.refresh_retries = retries;
        self
    }

    /// Network name inferred from the endpoint, if recognizable.
    pub fn network(&self) -> Option<&'static str> {
        infer_network_from_url(&self.rpc_url)
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::default()
            .with_batch_size(self.batch_size)
            .with_retry(RetryConfig::default().with_retries(self.refresh_retries))
            .with_options(ObjectDataOptions::full().with_display(self.include_display))
    }

    pub fn client(&self) -> JsonRpcClient {
        JsonRpcClient::with_timeouts(&self.rpc_url, self.timeout, self.connect_timeout)
    }

    pub fn source(&self) -> Arc<dyn RemoteDataSource> {
        Arc::new(self.client())
    }
}
