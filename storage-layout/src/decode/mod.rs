// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Recursive descent over a [`TypeDescriptor`] and a [`Location`], fetching
//! words from a [`StorageOracle`] only as needed. [`decode_value`] is the
//! single entry point every composite handle (array/struct/mapping) calls
//! back into when asked for an element/field/key.

pub(crate) mod array;
pub(crate) mod bytes;
pub(crate) mod mapping;
pub(crate) mod primitive;
pub(crate) mod struct_;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::value::Value;

pub(crate) fn decode_value<'a>(
    descriptor: &TypeDescriptor,
    location: Location,
    oracle: &'a dyn StorageOracle,
) -> Result<Value<'a>> {
    match descriptor {
        TypeDescriptor::Recursive(weak) => {
            let upgraded = weak.upgrade().ok_or_else(|| {
                Error::layout("dangling recursive type reference: ancestor type was dropped")
            })?;
            decode_value(&upgraded, location, oracle)
        }
        TypeDescriptor::Int(_)
        | TypeDescriptor::Uint(_)
        | TypeDescriptor::Bool
        | TypeDescriptor::Address
        | TypeDescriptor::FixedBytes(_) => primitive::decode_scalar(descriptor, location, oracle),

        TypeDescriptor::String | TypeDescriptor::DynamicBytes => {
            bytes::decode_dynamic(descriptor, location, oracle)
        }

        TypeDescriptor::FixedArray { unit, len } => {
            Ok(Value::Array(array::build_fixed(unit, *len, location, oracle)))
        }

        TypeDescriptor::DynamicArray { unit } => {
            Ok(Value::Array(array::build_dynamic(unit, location, oracle)))
        }

        TypeDescriptor::Struct { fields } => {
            Ok(Value::Struct(struct_::build(fields, location, oracle)))
        }

        TypeDescriptor::Mapping { key_kind, value } => Ok(Value::Mapping(mapping::build(
            *key_kind, value, location, oracle,
        ))),
    }
}
