// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::{Address, U256};

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::util::{bit_mask, format_hex_u256, low_u64, slot_key, word_to_uint};
use crate::value::Value;

/// Decodes any scalar (non-composite, non-dynamic) type: `Int`, `Uint`,
/// `Bool`, `Address`, `FixedBytes`. Fetches exactly one word.
pub(crate) fn decode_scalar(
    descriptor: &TypeDescriptor,
    location: Location,
    oracle: &dyn StorageOracle,
) -> Result<Value<'static>> {
    let w = descriptor
        .bit_width()
        .ok_or_else(|| Error::layout("scalar decoder invoked on a composite type"))?;

    if w == 0 {
        return Err(Error::layout("zero-width scalar type"));
    }
    if w > 256 {
        return Err(Error::layout(format!("width {w} exceeds 256 bits")));
    }
    if location.bit_offset as u32 + w as u32 > 256 {
        return Err(Error::layout(format!(
            "bit_offset {} + width {w} exceeds word boundary",
            location.bit_offset
        )));
    }

    let key = slot_key(location.slot);
    let word = oracle.fetch(key)?;
    log::trace!("fetched slot {key} for scalar width {w}");

    let word_int = word_to_uint(word);
    let shifted = word_int >> location.bit_offset as usize;
    let raw = shifted & bit_mask(w);

    let value = match descriptor {
        TypeDescriptor::Uint(_) => decode_uint(raw),
        TypeDescriptor::Int(_) => decode_int(raw, w),
        TypeDescriptor::Bool => Value::Bool(raw == U256::from(1u64)),
        TypeDescriptor::Address => {
            let bytes = raw.to_be_bytes::<32>();
            Value::Address(Address::from_slice(&bytes[12..32]))
        }
        TypeDescriptor::FixedBytes(n) => {
            let n = *n as usize;
            let bytes = raw.to_be_bytes::<32>();
            let mut payload = bytes[32 - n..32].to_vec();
            while payload.last() == Some(&0) {
                payload.pop();
            }
            Value::Bytes(payload)
        }
        other => {
            return Err(Error::layout(format!(
                "unsupported scalar descriptor {other:?}"
            )))
        }
    };
    Ok(value)
}

fn decode_uint(raw: U256) -> Value<'static> {
    if raw <= U256::from(u64::MAX) {
        Value::U64(low_u64(raw))
    } else {
        Value::HexU256(format_hex_u256(raw))
    }
}

fn decode_int(raw: U256, w: u16) -> Value<'static> {
    let sign_bit = (raw >> (w as usize - 1)) & U256::from(1u64);
    if sign_bit.is_zero() {
        Value::I64(low_u64(raw) as i64)
    } else {
        let mask = bit_mask(w);
        let magnitude = (!(raw - U256::from(1u64))) & mask;
        Value::I64(-(low_u64(magnitude) as i64))
    }
}
