// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::{keccak256, U256};

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::util::{slot_key, word_to_uint};
use crate::value::Value;

/// Decodes `String` or `DynamicBytes` at `location`, which must have
/// `bit_offset == 0` (dynamic types always occupy an entire slot at their
/// root). Distinguishes short-form (payload inline in the head word) from
/// long-form (payload in `keccak256(slot)`-derived slots) via the head
/// word's low bit.
pub(crate) fn decode_dynamic(
    descriptor: &TypeDescriptor,
    location: Location,
    oracle: &dyn StorageOracle,
) -> Result<Value<'static>> {
    let head_key = slot_key(location.slot);
    let head_word = oracle.fetch(head_key).map_err(|e| Error::Fetch {
        slot: head_key,
        reason: e.to_string(),
    })?;
    log::trace!("fetched head slot {head_key} for dynamic bytes/string");
    let h = word_to_uint(head_word);

    let payload = if (h & U256::from(1u64)).is_zero() {
        decode_short(h, head_word)
    } else {
        decode_long(h, location.slot, oracle)?
    };

    Ok(match descriptor {
        TypeDescriptor::String => Value::Str(String::from_utf8_lossy(&payload).into_owned()),
        TypeDescriptor::DynamicBytes => Value::Bytes(payload),
        other => return Err(Error::layout(format!("not a dynamic type: {other:?}"))),
    })
}

/// Short form: low byte of the head word is `byte_len * 2`; the payload is
/// the first `byte_len` bytes of the head word itself.
fn decode_short(h: U256, head_word: alloy_primitives::B256) -> Vec<u8> {
    let low_byte = (h & U256::from(0xffu64)).to::<u64>();
    let byte_len = (low_byte / 2) as usize;
    head_word.0[..byte_len].to_vec()
}

/// Long form: low byte is odd, `byte_len = (h - 1) / 2`; the payload lives
/// in sequential slots starting at `keccak256(slot)`.
fn decode_long(h: U256, slot: U256, oracle: &dyn StorageOracle) -> Result<Vec<u8>> {
    let byte_len = ((h - U256::from(1u64)) / U256::from(2u64)).to::<u64>() as usize;
    let base = U256::from_be_bytes(keccak256(slot_key(slot)).0);

    let full_words = byte_len / 32;
    let tail = byte_len % 32;

    let mut payload = Vec::with_capacity(byte_len);
    for i in 0..full_words {
        let key = slot_key(base + U256::from(i as u64));
        let word = oracle.fetch(key).map_err(|e| Error::Fetch {
            slot: key,
            reason: e.to_string(),
        })?;
        log::trace!("fetched tail slot {key} ({i} of {full_words} full words)");
        payload.extend_from_slice(word.as_slice());
    }
    if tail > 0 {
        let key = slot_key(base + U256::from(full_words as u64));
        let word = oracle.fetch(key).map_err(|e| Error::Fetch {
            slot: key,
            reason: e.to_string(),
        })?;
        log::trace!("fetched final partial tail slot {key} ({tail} bytes)");
        payload.extend_from_slice(&word.0[..tail]);
    }
    Ok(payload)
}
