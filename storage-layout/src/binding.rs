// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};

use crate::decode;
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::layout::{self, StorageLayoutDoc};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::value::Value;

struct BoundVariable {
    descriptor: Arc<TypeDescriptor>,
    slot: U256,
    bit_offset: u16,
}

/// A human-facing description of one bound variable, as returned by
/// [`ContractBinding::list_variables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDesc {
    pub name: String,
    pub type_label: String,
}

/// The named collection produced by ingesting a storage-layout document:
/// a map from variable name to its root descriptor and location. Immutable
/// once built, and safe to share across threads and concurrent decodes —
/// nothing here is mutated by reading a variable.
pub struct ContractBinding {
    address: Address,
    rpc_endpoint: String,
    variables: HashMap<String, BoundVariable>,
}

/// Binds metadata only: no network calls are made. Call
/// [`ContractBinding::ingest_layout`] to populate it from a compiler
/// storage-layout document.
pub fn new_contract(address: Address, rpc_endpoint: impl Into<String>) -> ContractBinding {
    ContractBinding {
        address,
        rpc_endpoint: rpc_endpoint.into(),
        variables: HashMap::new(),
    }
}

impl ContractBinding {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn rpc_endpoint(&self) -> &str {
        &self.rpc_endpoint
    }

    /// Parses a compiler-emitted `--storage-layout` JSON document and
    /// registers every top-level variable it declares. Idempotent: calling
    /// this again with the same (or an updated) document simply
    /// re-registers each variable under its label.
    pub fn ingest_layout(&mut self, json: &str) -> Result<()> {
        let doc: StorageLayoutDoc = serde_json::from_str(json)?;
        let resolved = layout::resolve(&doc)?;
        for var in resolved {
            self.variables.insert(
                var.name,
                BoundVariable {
                    descriptor: var.descriptor,
                    slot: var.slot,
                    bit_offset: var.bit_offset,
                },
            );
        }
        Ok(())
    }

    /// All bound variables, sorted by name.
    pub fn list_variables(&self) -> Vec<VariableDesc> {
        let mut out: Vec<VariableDesc> = self
            .variables
            .iter()
            .map(|(name, v)| VariableDesc {
                name: name.clone(),
                type_label: v.descriptor.canonical_label(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Decodes a bound variable's value, fetching only the words its
    /// descriptor transitively requires.
    pub fn read_variable<'a>(
        &self,
        name: &str,
        oracle: &'a dyn StorageOracle,
    ) -> Result<Value<'a>> {
        let var = self
            .variables
            .get(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        let location = Location::new(var.slot, var.bit_offset);
        decode::decode_value(&var.descriptor, location, oracle)
    }
}
