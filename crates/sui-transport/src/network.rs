//! Fullnode endpoints and network inference.

use sui_mirror_types::env_utils::env_string;

pub const MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";
pub const TESTNET_RPC: &str = "https://fullnode.testnet.sui.io:443";
pub const DEVNET_RPC: &str = "https://fullnode.devnet.sui.io:443";
pub const LOCALNET_RPC: &str = "http://127.0.0.1:9000";

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("devnet") {
        Some("devnet")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else if lower.contains("127.0.0.1") || lower.contains("localhost") {
        Some("localnet")
    } else {
        None
    }
}

pub fn default_rpc_endpoint(network: &str) -> &'static str {
    match network {
        "testnet" => TESTNET_RPC,
        "devnet" => DEVNET_RPC,
        "localnet" => LOCALNET_RPC,
        _ => MAINNET_RPC,
    }
}

/// Resolve the endpoint to talk to.
///
/// An explicit value wins; a bare network name (`testnet`) maps to its fullnode;
/// otherwise `SUI_RPC_URL` is consulted, then mainnet.
pub fn resolve_rpc_endpoint(explicit: Option<&str>) -> String {
    let chosen = explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| env_string("SUI_RPC_URL"));

    match chosen {
        Some(value) if value.contains("://") => value,
        Some(value) => default_rpc_endpoint(&value.to_lowercase()).to_string(),
        None => MAINNET_RPC.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_network() {
        assert_eq!(infer_network_from_url(TESTNET_RPC), Some("testnet"));
        assert_eq!(infer_network_from_url("HTTPS://FULLNODE.MAINNET.SUI.IO"), Some("mainnet"));
        assert_eq!(infer_network_from_url(LOCALNET_RPC), Some("localnet"));
        assert_eq!(infer_network_from_url("https://rpc.example.org"), None);
    }

    #[test]
    fn test_resolve_explicit_endpoint() {
        assert_eq!(resolve_rpc_endpoint(Some("devnet")), DEVNET_RPC);
        assert_eq!(
            resolve_rpc_endpoint(Some(" https://rpc.example.org ")),
            "https://rpc.example.org"
        );
        assert_eq!(default_rpc_endpoint("unknown"), MAINNET_RPC);
    }
}
