// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Demonstrates wiring `storage-layout` against a real chain: fetches a
//! contract's compiler `--storage-layout` JSON from disk, binds it, and
//! decodes one named variable by querying a live `eth_getStorageAt`
//! endpoint through `alloy`.
//!
//! This binary is demonstration only. `storage-layout`'s own test suite
//! never depends on it and it performs no networking of its own in tests.

use std::fs;
use std::path::PathBuf;

use alloy::providers::{Provider, ProviderBuilder};
use alloy_primitives::{Address, B256, U256};
use clap::Parser;
use eyre::{Result, WrapErr};
use storage_layout::{new_contract, StorageOracle, Value};

#[derive(Debug, Parser)]
#[command(name = "layout-cat")]
#[command(about = "Decode one storage variable off a live Ethereum contract", long_about = None)]
struct Args {
    /// JSON-RPC endpoint to query `eth_getStorageAt` against.
    #[arg(long)]
    rpc_url: String,

    /// Address of the deployed contract.
    #[arg(long)]
    address: Address,

    /// Path to the compiler-emitted `--storage-layout` JSON document.
    #[arg(long)]
    layout: PathBuf,

    /// Name of the top-level variable to decode.
    variable: String,

    /// Look up this key if the variable is a mapping.
    #[arg(long)]
    key: Option<String>,

    /// Index into this element if the variable is an array.
    #[arg(long)]
    index: Option<u64>,

    /// Read this field if the variable is a struct.
    #[arg(long)]
    field: Option<String>,

    /// Print debug-level logs, including every fetched slot.
    #[arg(long)]
    verbose: bool,
}

/// Adapts an `alloy` RPC provider into the blocking `StorageOracle` the
/// decoder expects, the same way `stylus-test::TestVM` blocks an async
/// provider call from a synchronous `StorageAccess` trait method.
struct AlloyOracle<P> {
    provider: P,
    address: Address,
    runtime: tokio::runtime::Handle,
}

impl<P: Provider> StorageOracle for AlloyOracle<P> {
    fn fetch(&self, slot: B256) -> storage_layout::Result<B256> {
        let key = U256::from_be_bytes(slot.0);
        // `fetch` is called synchronously from within a task already driven
        // by this multi-thread runtime, so a plain `Handle::block_on` here
        // would panic ("Cannot block the current thread from within a
        // runtime"). `block_in_place` hands this worker thread's other tasks
        // off to the remaining pool threads first, making it safe to block.
        let word = tokio::task::block_in_place(|| {
            self.runtime
                .block_on(async { self.provider.get_storage_at(self.address, key).await })
        })
        .map_err(|e| storage_layout::Error::Fetch {
            slot,
            reason: e.to_string(),
        })?;
        Ok(B256::from(word))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(log_level).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("building async runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let layout_json = fs::read_to_string(&args.layout)
        .wrap_err_with(|| format!("reading layout document at {:?}", args.layout))?;

    let mut binding = new_contract(args.address, args.rpc_url.clone());
    binding
        .ingest_layout(&layout_json)
        .wrap_err("ingesting storage-layout document")?;

    let provider = ProviderBuilder::new().connect(&args.rpc_url).await?;
    let oracle = AlloyOracle {
        provider,
        address: args.address,
        runtime: tokio::runtime::Handle::current(),
    };

    let value = binding
        .read_variable(&args.variable, &oracle)
        .wrap_err_with(|| format!("reading variable {:?}", args.variable))?;

    print_value(&value, args.key.as_deref(), args.index, args.field.as_deref())
}

fn print_value(
    value: &Value<'_>,
    key: Option<&str>,
    index: Option<u64>,
    field: Option<&str>,
) -> Result<()> {
    match value {
        Value::Array(array) => {
            let len = array.len()?;
            match index {
                Some(i) => {
                    let element = array.index(i)?;
                    println!("{element:?}");
                }
                None => println!("Array(len={len})"),
            }
        }
        Value::Struct(s) => match field {
            Some(name) => {
                let element = s.field(name)?;
                println!("{element:?}");
            }
            None => println!("Struct(fields={:?})", s.field_names()),
        },
        Value::Mapping(m) => match key {
            Some(k) => {
                let element = m.at(k)?;
                println!("{element:?}");
            }
            None => println!("Mapping(pass --key to look up an entry)"),
        },
        other => println!("{other:?}"),
    }
    Ok(())
}
