// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::B256;

use crate::error::Result;

/// External collaborator that returns the 32-byte word stored at a given
/// storage slot. The only I/O boundary the decoder ever crosses.
///
/// Implementations must be idempotent with respect to `slot` and must not
/// be mutated by the decoder; a caller wrapping a real JSON-RPC provider
/// (e.g. `alloy`'s `Provider::get_storage_at`) should block on its own
/// async runtime inside `fetch`.
pub trait StorageOracle: Send + Sync {
    fn fetch(&self, slot: B256) -> Result<B256>;
}

impl<T: StorageOracle + ?Sized> StorageOracle for &T {
    fn fetch(&self, slot: B256) -> Result<B256> {
        (**self).fetch(slot)
    }
}
