//! Sui Mirror Transport Layer
//!
//! Remote data sources the mirror reads Sui state from.
//!
//! This crate provides:
//! - [`source`]: the [`RemoteDataSource`] trait (object reads + paged queries)
//! - [`jsonrpc`]: [`JsonRpcClient`], a fullnode JSON-RPC client
//! - [`memory`]: [`InMemoryDataSource`], a deterministic in-process node
//! - [`network`]: endpoint constants and resolution
//! - [`retry`]: exponential backoff for transient failures
//!
//! # Example
//!
//! ```ignore
//! use sui_mirror_transport::{JsonRpcClient, RemoteDataSource};
//! use sui_mirror_types::ObjectDataOptions;
//!
//! let client = JsonRpcClient::mainnet();
//! let clock = client.get_object("0x6", ObjectDataOptions::full()).await?;
//! ```

pub mod jsonrpc;
pub mod memory;
pub mod network;
pub mod retry;
pub mod source;

pub use jsonrpc::JsonRpcClient;
pub use memory::InMemoryDataSource;
pub use retry::with_retries;
pub use source::RemoteDataSource;
