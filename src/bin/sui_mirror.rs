//! sui-mirror: inspect Sui objects, events and dynamic fields through the mirror cache
//!
//! ## Example Usage
//!
//! ```bash
//! # Track objects, refresh them once and print their state
//! sui-mirror objects 0x6 0x5
//!
//! # Newest 20 events of a module
//! sui-mirror events --package 0x2 --module coin --max 20
//!
//! # Dynamic fields of an object on testnet
//! sui-mirror --rpc-url testnet dynamic-fields 0xabc
//! ```
//!
//! Endpoint selection: `--rpc-url`, then `SUI_RPC_URL` (also read from `.env`), then
//! mainnet.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use serde_json::json;

use sui_mirror::types::{normalize_id, SortOrder};
use sui_mirror::{CacheRegistry, MirrorConfig, PageRow, PagedCursor};

#[derive(Parser)]
#[command(
    name = "sui-mirror",
    author,
    version,
    about = "Mirror Sui object state, events and dynamic fields locally"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Endpoint URL or network name (mainnet, testnet, devnet, localnet)
    #[arg(long, global = true)]
    rpc_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Track objects, refresh them once and print them as JSON
    Objects {
        /// Object ids, in any spelling (0x2, 2, 0x000...002)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print events emitted by a module, newest first
    Events {
        #[arg(long)]
        package: String,

        #[arg(long)]
        module: String,

        /// Only events of this struct name within the module
        #[arg(long)]
        event_type: Option<String>,

        /// Maximum number of events
        #[arg(long, default_value_t = 50)]
        max: usize,

        /// Oldest first
        #[arg(long)]
        ascending: bool,
    },

    /// Print the dynamic fields of an object
    DynamicFields {
        parent: String,

        /// Maximum number of fields
        #[arg(long, default_value_t = 50)]
        max: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let Cli { command, rpc_url } = Cli::parse();

    let mut config = MirrorConfig::from_env();
    if let Some(rpc_url) = rpc_url.as_deref() {
        config = config.with_rpc_url(rpc_url);
    }

    match command {
        Commands::Objects { ids } => objects(&config, &ids).await,
        Commands::Events {
            package,
            module,
            event_type,
            max,
            ascending,
        } => events(&config, &package, &module, event_type.as_deref(), max, ascending).await,
        Commands::DynamicFields { parent, max } => dynamic_fields(&config, &parent, max).await,
    }
}

async fn objects(config: &MirrorConfig, ids: &[String]) -> Result<()> {
    for id in ids {
        normalize_id(id)?;
    }

    let registry = CacheRegistry::with_policy(config.refresh_policy());
    let cache = registry.instance_for_source(config.source());
    for id in ids {
        cache.try_push(id.as_str())?;
    }

    let report = cache.refresh_all().await;
    if !report.is_complete() {
        eprintln!(
            "warning: {} of {} batches failed; some objects show stale state",
            report.failed_batches, report.batches
        );
    }

    let objects: Vec<_> = cache.snapshot().iter().map(|h| h.snapshot()).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "endpoint": cache.endpoint(),
            "report": report,
            "objects": objects,
        }))?
    );
    Ok(())
}

async fn events(
    config: &MirrorConfig,
    package: &str,
    module: &str,
    event_type: Option<&str>,
    max: usize,
    ascending: bool,
) -> Result<()> {
    let package = normalize_id(package)?;
    let order = if ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    let cursor = PagedCursor::module_events(config.source(), &package, module, event_type)
        .with_order(order)
        .with_limit(config.page_limit);

    let mut rows = Box::pin(cursor.into_stream(Some(max)));
    while let Some(row) = rows.try_next().await.context("event query failed")? {
        if let PageRow::Event(event) = row {
            println!(
                "{}",
                json!({
                    "type": event.event_type(),
                    "typeName": event.type_name(),
                    "sender": event.sender(),
                    "timestampMs": event.timestamp_ms(),
                    "parsedJson": event.parsed_json(),
                })
            );
        }
    }
    Ok(())
}

async fn dynamic_fields(config: &MirrorConfig, parent: &str, max: usize) -> Result<()> {
    let mut cursor =
        PagedCursor::dynamic_fields(config.source(), parent)?.with_limit(config.page_limit);

    cursor
        .for_each(
            |row| async move {
                if let PageRow::DynamicField(field) = row {
                    println!("{}", serde_json::to_string(&field)?);
                }
                Ok(())
            },
            Some(max),
        )
        .await
        .context("dynamic field query failed")?;
    Ok(())
}
