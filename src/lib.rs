//! Sui Mirror
//!
//! A local, in-memory mirror of Sui object state kept consistent with a remote node:
//!
//! - **Tracked objects**: [`TrackedObject`] mirrors one on-chain object; shared via [`ObjectHandle`]
//! - **Object cache**: [`ObjectCache`] de-duplicates by normalized id and refreshes in batches
//! - **Pagination**: [`PagedCursor`] walks events, transactions, dynamic fields and owned objects
//! - **Registry**: [`CacheRegistry`] hands out one cache per endpoint
//!
//! Node access goes through [`sui_mirror_transport::RemoteDataSource`].

#![allow(clippy::result_large_err)]

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod paged;
pub mod queries;
pub mod registry;
pub mod tracked;
pub mod transaction;

pub use cache::{
    CacheEvent, ChangeSet, ObjectCache, PushTarget, RefreshPolicy, RefreshReport, MAX_BATCH_SIZE,
};
pub use config::MirrorConfig;
pub use error::{MirrorError, Result};
pub use event::ChainEvent;
pub use paged::{CursorState, PageRow, PagedCursor};
pub use registry::CacheRegistry;
pub use tracked::{ObjectHandle, TrackedObject};
pub use transaction::{TransactionOutcome, TransactionResults};

pub use sui_mirror_transport as transport;
pub use sui_mirror_types as types;
