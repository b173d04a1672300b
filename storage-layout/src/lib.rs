// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Decodes Ethereum smart-contract persistent storage into typed values.
//!
//! Contracts expose their state as a flat, 256-bit-word-addressable
//! key-value store, but the Solidity compiler packs high-level typed
//! variables into that store using a documented layout scheme. Given an
//! oracle that returns the raw word at any storage slot and the compiler's
//! `--storage-layout` JSON, this crate decodes named variables into
//! [`Value`]s: integers, booleans, addresses, fixed/dynamic byte strings,
//! arrays, structs, and mappings, including arbitrary nesting.
//!
//! Writing to storage, proving a layout against bytecode, and decoding
//! calldata/event/memory data are all out of scope — see the crate's
//! design notes for the full rationale.

mod binding;
mod decode;
mod descriptor;
mod error;
mod layout;
mod location;
mod oracle;
#[cfg(test)]
mod testutil;
mod util;
mod value;

pub use binding::{new_contract, ContractBinding, VariableDesc};
pub use descriptor::{KeyKind, StructField, TypeDescriptor};
pub use error::{Error, Result};
pub use location::Location;
pub use oracle::StorageOracle;
pub use value::{ArrayValue, MappingValue, StructValue, Value};
