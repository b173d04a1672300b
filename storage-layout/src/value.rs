// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::cell::OnceCell;
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, U256};

use crate::decode;
use crate::descriptor::{struct_slot_footprint, StructField, TypeDescriptor};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::util::slot_key;

/// A decoded storage value. `Array`, `Struct`, and `Mapping` are lazy
/// handles: constructing one never fetches a word beyond what's needed to
/// know its own metadata (a dynamic array's length, say); reading an
/// element, field, or key does the actual fetch.
pub enum Value<'a> {
    I64(i64),
    U64(u64),
    HexU256(String),
    Bool(bool),
    Address(Address),
    Bytes(Vec<u8>),
    Str(String),
    Array(ArrayValue<'a>),
    Struct(StructValue<'a>),
    Mapping(MappingValue<'a>),
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I64(v) => write!(f, "I64({v})"),
            Value::U64(v) => write!(f, "U64({v})"),
            Value::HexU256(v) => write!(f, "HexU256({v})"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Address(v) => write!(f, "Address({v})"),
            Value::Bytes(v) => write!(f, "Bytes(0x{})", hex_lower(v)),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Array(v) => write!(f, "Array(len={:?})", v.len()),
            Value::Struct(v) => write!(f, "Struct({:?})", v.field_names()),
            Value::Mapping(_) => write!(f, "Mapping(..)"),
        }
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Clone, Copy)]
pub(crate) enum ArrayKind {
    Fixed { len: u64 },
    Dynamic { root_slot: U256 },
}

/// Lazy handle over a `FixedArray` or `DynamicArray`. `.index(i)` performs
/// exactly the fetches needed for element `i`; no other element is ever
/// touched.
pub struct ArrayValue<'a> {
    pub(crate) elements_base: U256,
    pub(crate) kind: ArrayKind,
    pub(crate) element: Arc<TypeDescriptor>,
    pub(crate) oracle: &'a dyn StorageOracle,
    pub(crate) dynamic_len: OnceCell<u64>,
}

impl<'a> ArrayValue<'a> {
    pub fn len(&self) -> Result<u64> {
        match self.kind {
            ArrayKind::Fixed { len } => Ok(len),
            ArrayKind::Dynamic { root_slot } => {
                if let Some(len) = self.dynamic_len.get() {
                    return Ok(*len);
                }
                let key = slot_key(root_slot);
                let word = self
                    .oracle
                    .fetch(key)
                    .map_err(|e| Error::Fetch {
                        slot: key,
                        reason: e.to_string(),
                    })?;
                let len = crate::util::low_u64(crate::util::word_to_uint(word));
                log::trace!("fetched length slot {key} for dynamic array: len={len}");
                let _ = self.dynamic_len.set(len);
                Ok(len)
            }
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn index(&self, i: u64) -> Result<Value<'a>> {
        let len = self.len()?;
        if i >= len {
            return Err(Error::Index { index: i, len });
        }
        let location = decode::array::element_location(self.elements_base, &self.element, i);
        decode::decode_value(&self.element, location, self.oracle)
    }
}

/// Lazy handle over a struct: `.field(name)` decodes only that field.
pub struct StructValue<'a> {
    pub(crate) base_slot: U256,
    pub(crate) fields: Arc<Vec<StructField>>,
    pub(crate) oracle: &'a dyn StorageOracle,
}

impl<'a> StructValue<'a> {
    pub fn field(&self, name: &str) -> Result<Value<'a>> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownField {
                field: name.to_string(),
            })?;
        let location = Location::new(self.base_slot + U256::from(field.slot_offset), field.bit_offset);
        decode::decode_value(&field.descriptor, location, self.oracle)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of slots this struct instance occupies.
    pub fn slot_footprint(&self) -> u64 {
        struct_slot_footprint(&self.fields)
    }
}

/// Lazy handle over a mapping. Mappings are not enumerable: there is no
/// `.keys()` or `.len()`, only `.at(key)`.
pub struct MappingValue<'a> {
    pub(crate) base_slot: U256,
    pub(crate) key_kind: crate::descriptor::KeyKind,
    pub(crate) value: Arc<TypeDescriptor>,
    pub(crate) oracle: &'a dyn StorageOracle,
}

impl<'a> MappingValue<'a> {
    pub fn at(&self, key: &str) -> Result<Value<'a>> {
        let encoded = decode::mapping::encode_key(self.key_kind, key)?;
        let mut preimage = encoded;
        preimage.extend_from_slice(slot_key(self.base_slot).as_slice());
        let value_slot = U256::from_be_bytes(keccak256(preimage).0);
        log::trace!("derived mapping value slot {value_slot:#x} for key {key:?}");
        decode::decode_value(&self.value, Location::root(value_slot), self.oracle)
    }
}
