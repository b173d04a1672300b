// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::{B256, U256};

/// Renders a storage slot index as the 32-byte key the oracle expects.
pub(crate) fn slot_key(slot: U256) -> B256 {
    B256::from(slot.to_be_bytes::<32>())
}

/// Interprets a fetched word as a big-endian 256-bit unsigned integer.
pub(crate) fn word_to_uint(word: B256) -> U256 {
    U256::from_be_bytes(word.0)
}

/// `(1 << w) - 1`, saturating correctly at `w == 256`.
pub(crate) fn bit_mask(w: u16) -> U256 {
    if w >= 256 {
        U256::MAX
    } else {
        (U256::from(1u64) << w as usize) - U256::from(1u64)
    }
}

/// Low 64 bits of a `U256`, truncating silently. Matches the source
/// behavior this crate is derived from, which represents every `Int`/`Uint`
/// through a native 64-bit integer regardless of declared width.
pub(crate) fn low_u64(v: U256) -> u64 {
    v.as_limbs()[0]
}

/// Renders a `U256` as `0x` followed by exactly 64 lowercase hex digits,
/// the big-endian 32-byte encoding `Value::HexU256` promises.
pub(crate) fn format_hex_u256(v: U256) -> String {
    let bytes = v.to_be_bytes::<32>();
    let mut s = String::with_capacity(66);
    s.push_str("0x");
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
