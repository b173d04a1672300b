// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::cell::OnceCell;
use std::sync::Arc;

use alloy_primitives::{keccak256, U256};

use crate::descriptor::{struct_slot_footprint, TypeDescriptor};
use crate::location::Location;
use crate::oracle::StorageOracle;
use crate::util::slot_key;
use crate::value::{ArrayKind, ArrayValue};

/// Builds the lazy handle for a `FixedArray`. No fetch occurs: the length
/// and element base are both known from the descriptor and the location.
pub(crate) fn build_fixed<'a>(
    unit: &Arc<TypeDescriptor>,
    len: u64,
    location: Location,
    oracle: &'a dyn StorageOracle,
) -> ArrayValue<'a> {
    ArrayValue {
        elements_base: location.slot,
        kind: ArrayKind::Fixed { len },
        element: unit.clone(),
        oracle,
        dynamic_len: OnceCell::new(),
    }
}

/// Builds the lazy handle for a `DynamicArray`. No fetch occurs here
/// either: the length fetch is deferred to `ArrayValue::len`/`index`, and
/// the element base (`keccak256(slot)`) is a pure function of the slot.
pub(crate) fn build_dynamic<'a>(
    unit: &Arc<TypeDescriptor>,
    location: Location,
    oracle: &'a dyn StorageOracle,
) -> ArrayValue<'a> {
    let elements_base = U256::from_be_bytes(keccak256(slot_key(location.slot)).0);
    ArrayValue {
        elements_base,
        kind: ArrayKind::Dynamic {
            root_slot: location.slot,
        },
        element: unit.clone(),
        oracle,
        dynamic_len: OnceCell::new(),
    }
}

/// Computes the location of element `i`, given the slot elements begin at.
///
/// - Scalar elements (`Int`/`Uint`/`Bool`/`Address`/`FixedBytes`) are packed
///   contiguously, least-significant-bit first, across as many consecutive
///   slots as needed.
/// - Struct elements each occupy `slot_footprint` whole slots.
/// - Every other element kind (dynamic types) consumes exactly one slot of
///   metadata, delegated to recursively.
pub(crate) fn element_location(
    elements_base: U256,
    element: &TypeDescriptor,
    i: u64,
) -> Location {
    if let Some(w) = element.bit_width() {
        let absolute_bit = i as u128 * w as u128;
        let slot = elements_base + U256::from(absolute_bit / 256);
        let bit_offset = (absolute_bit % 256) as u16;
        Location::new(slot, bit_offset)
    } else if let TypeDescriptor::Struct { fields } = element {
        let footprint = struct_slot_footprint(fields);
        Location::new(elements_base + U256::from(i) * U256::from(footprint), 0)
    } else {
        Location::new(elements_base + U256::from(i), 0)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{keccak256, B256};

    use super::*;
    use crate::descriptor::StructField;
    use crate::testutil::MapOracle;
    use crate::value::Value;

    #[test]
    fn dynamic_array_of_uint8() {
        // S5.
        let slot = U256::from(0x0cu64);
        let oracle = MapOracle::new();
        oracle.set(slot, B256::from(U256::from(5u64).to_be_bytes::<32>()));
        let base = U256::from_be_bytes(keccak256(B256::from(slot.to_be_bytes::<32>())).0);
        // Element i lives at bit_offset i*8, i.e. byte index (31 - i): the
        // word's low byte (index 31) is element 0.
        let mut word = [0u8; 32];
        word[27..32].copy_from_slice(&[5, 4, 3, 2, 1]);
        oracle.set(base, B256::from(word));

        let unit = Arc::new(TypeDescriptor::Uint(8));
        let array = build_dynamic(&unit, Location::root(slot), &oracle);
        assert_eq!(array.len().unwrap(), 5);
        for (i, expected) in [1u64, 2, 3, 4, 5].into_iter().enumerate() {
            let v = array.index(i as u64).unwrap();
            assert!(matches!(v, Value::U64(x) if x == expected));
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let unit = Arc::new(TypeDescriptor::Uint(8));
        let array = build_fixed(&unit, 3, Location::root(U256::ZERO), &MapOracle::new());
        assert!(array.index(3).is_err());
    }

    #[test]
    fn fixed_array_index_matches_explicit_offset_decode() {
        // Property 8: `.index(i)` must equal a direct decode at
        // `(base + floor(i*w/256), (i*w) mod 256)`.
        let unit = Arc::new(TypeDescriptor::Uint(64));
        let base = U256::from(0x20u64);
        let oracle = MapOracle::new();
        // Four uint64s packed per slot; seed two slots of distinct values.
        oracle.set(base, B256::from(U256::from(0x0004000300020001u64).to_be_bytes::<32>()));
        oracle.set(
            base + U256::from(1u64),
            B256::from(U256::from(0x0008000700060005u64).to_be_bytes::<32>()),
        );

        let array = build_fixed(&unit, 8, Location::root(base), &oracle);
        for i in 0..8u64 {
            let direct = crate::decode::primitive::decode_scalar(&unit, element_location(base, &unit, i), &oracle)
                .unwrap();
            let via_index = array.index(i).unwrap();
            match (direct, via_index) {
                (Value::U64(a), Value::U64(b)) => assert_eq!(a, b, "mismatch at i={i}"),
                other => panic!("expected two U64 values, got {other:?}"),
            }
        }
    }

    #[test]
    fn struct_elements_step_by_slot_footprint() {
        // S7.
        let fields = Arc::new(vec![
            StructField {
                name: "id".to_string(),
                slot_offset: 0,
                bit_offset: 0,
                descriptor: Arc::new(TypeDescriptor::Uint(256)),
            },
            StructField {
                name: "value".to_string(),
                slot_offset: 1,
                bit_offset: 0,
                descriptor: Arc::new(TypeDescriptor::String),
            },
        ]);
        let element = TypeDescriptor::Struct { fields };
        let base = U256::from(0x1au64);
        let loc0 = element_location(base, &element, 0);
        let loc1 = element_location(base, &element, 1);
        assert_eq!(loc0.slot, base);
        assert_eq!(loc1.slot, base + U256::from(2u64));
    }
}
