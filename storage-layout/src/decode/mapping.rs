// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::sync::Arc;

use alloy_primitives::U256;

use crate::descriptor::{KeyKind, TypeDescriptor};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::value::MappingValue;

/// Builds the lazy handle for a mapping. Mappings are never enumerable
/// from storage alone, so there's nothing to fetch up front.
pub(crate) fn build<'a>(
    key_kind: KeyKind,
    value: &Arc<TypeDescriptor>,
    location: Location,
    oracle: &'a dyn StorageOracle,
) -> MappingValue<'a> {
    MappingValue {
        base_slot: location.slot,
        key_kind,
        value: value.clone(),
        oracle,
    }
}

/// Encodes a textual key per the rules for `key_kind`. Fixed-width kinds
/// (`Uint`, `Int`, `Address`, `FixedBytes`) always return exactly 32 bytes;
/// `StringOrBytes` returns the key's bytes at their natural length,
/// unpadded, matching Solidity's own preimage construction for
/// `mapping(string => V)` and `mapping(bytes => V)`.
pub(crate) fn encode_key(key_kind: KeyKind, key: &str) -> Result<Vec<u8>> {
    match key_kind {
        KeyKind::Uint => encode_uint_key(key),
        KeyKind::Int => encode_int_key(key),
        KeyKind::Address => encode_address_key(key),
        KeyKind::FixedBytes => encode_fixed_bytes_key(key),
        KeyKind::StringOrBytes => Ok(key.as_bytes().to_vec()),
    }
}

fn encode_uint_key(key: &str) -> Result<Vec<u8>> {
    let value = if let Some(hex) = key.strip_prefix("0x") {
        U256::from_str_radix(hex, 16)
            .map_err(|e| Error::KeyParse(format!("invalid hex uint key {key:?}: {e}")))?
    } else {
        U256::from_str_radix(key, 10)
            .map_err(|e| Error::KeyParse(format!("invalid decimal uint key {key:?}: {e}")))?
    };
    Ok(value.to_be_bytes::<32>().to_vec())
}

fn encode_int_key(key: &str) -> Result<Vec<u8>> {
    let value: i128 = key
        .parse()
        .map_err(|e| Error::KeyParse(format!("invalid signed int key {key:?}: {e}")))?;
    let encoded = if value >= 0 {
        U256::from(value as u128)
    } else {
        U256::MAX - U256::from(value.unsigned_abs()) + U256::from(1u64)
    };
    Ok(encoded.to_be_bytes::<32>().to_vec())
}

fn encode_address_key(key: &str) -> Result<Vec<u8>> {
    let hex = key
        .strip_prefix("0x")
        .ok_or_else(|| Error::KeyParse(format!("address key {key:?} must be 0x-prefixed")))?;
    let bytes = hex::decode(hex)
        .map_err(|e| Error::KeyParse(format!("invalid hex address key {key:?}: {e}")))?;
    if bytes.len() != 20 {
        return Err(Error::KeyParse(format!(
            "address key {key:?} must decode to 20 bytes, got {}",
            bytes.len()
        )));
    }
    let mut padded = vec![0u8; 12];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}

fn encode_fixed_bytes_key(key: &str) -> Result<Vec<u8>> {
    let mut bytes = if let Some(hex_str) = key.strip_prefix("0x") {
        hex::decode(hex_str)
            .map_err(|e| Error::KeyParse(format!("invalid hex bytes key {key:?}: {e}")))?
    } else {
        key.as_bytes().to_vec()
    };
    if bytes.len() > 32 {
        return Err(Error::KeyParse(format!(
            "fixed-bytes key {key:?} exceeds 32 bytes"
        )));
    }
    bytes.resize(32, 0);
    Ok(bytes)
}
