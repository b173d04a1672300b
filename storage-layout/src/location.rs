// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::U256;

/// A `(slot, bit_offset)` pair: where a value described by some
/// [`crate::TypeDescriptor`] actually lives. Passed alongside the
/// descriptor into every decode call rather than stored on it, so that
/// descriptor graphs stay immutable and freely shareable across concurrent
/// decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub slot: U256,
    pub bit_offset: u16,
}

impl Location {
    pub fn new(slot: U256, bit_offset: u16) -> Self {
        Self { slot, bit_offset }
    }

    pub fn root(slot: U256) -> Self {
        Self { slot, bit_offset: 0 }
    }
}
