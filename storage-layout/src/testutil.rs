// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! In-memory [`StorageOracle`] for unit tests: plays the role `TestVM` plays
//! for `stylus-sdk`'s own storage tests, minus any on-chain execution.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::{B256, U256};

use crate::error::Result;
use crate::oracle::StorageOracle;

#[derive(Default)]
pub(crate) struct MapOracle {
    words: Mutex<HashMap<B256, B256>>,
    pub(crate) fetches: Mutex<Vec<B256>>,
}

impl MapOracle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds the word at a `U256` slot index.
    pub(crate) fn set(&self, slot: U256, word: B256) {
        self.words
            .lock()
            .unwrap()
            .insert(B256::from(slot.to_be_bytes::<32>()), word);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl StorageOracle for MapOracle {
    fn fetch(&self, slot: B256) -> Result<B256> {
        self.fetches.lock().unwrap().push(slot);
        Ok(self.words.lock().unwrap().get(&slot).copied().unwrap_or_default())
    }
}
