// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::sync::Arc;

use crate::descriptor::StructField;
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::value::StructValue;

/// Builds the lazy handle for a struct. No fetch occurs; each field is
/// decoded only when `.field(name)` is called.
pub(crate) fn build<'a>(
    fields: &Arc<Vec<StructField>>,
    location: Location,
    oracle: &'a dyn StorageOracle,
) -> StructValue<'a> {
    StructValue {
        base_slot: location.slot,
        fields: fields.clone(),
        oracle,
    }
}
