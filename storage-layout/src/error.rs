// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy_primitives::B256;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while resolving a layout document or
/// decoding a value out of it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fetch error at slot {slot}: {reason}")]
    Fetch { slot: B256, reason: String },

    #[error("layout error: {0}")]
    Layout(String),

    #[error("key parse error: {0}")]
    KeyParse(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unknown field {field} on struct")]
    UnknownField { field: String },

    #[error("index {index} out of range (len {len})")]
    Index { index: u64, len: u64 },

    #[error("integer overflow decoding {label}: raw value does not fit in 64 bits")]
    DecodeOverflow { label: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn layout(msg: impl Into<String>) -> Self {
        Error::Layout(msg.into())
    }
}
