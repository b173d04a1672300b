// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::sync::{Arc, Weak};

/// Immutable, location-free description of a declared storage type.
///
/// Descriptors never carry a slot or bit offset: those are threaded
/// alongside every decode call as a [`crate::Location`]. This is the main
/// redesign point relative to the reflection-based source this crate is
/// derived from, which mutated a `SlotIndex` field on the type value itself
/// immediately before each read.
///
/// Composite variants hold their children behind [`Arc`] rather than by
/// value so that cyclic type graphs (a struct containing a mapping whose
/// value type is the same struct) can be built during ingestion without
/// infinite recursion: the ingester resolves each type-id once and clones
/// the `Arc` on every subsequent reference.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Int(u16),
    Uint(u16),
    Bool,
    Address,
    FixedBytes(u16),
    String,
    DynamicBytes,
    FixedArray {
        unit: Arc<TypeDescriptor>,
        len: u64,
    },
    DynamicArray {
        unit: Arc<TypeDescriptor>,
    },
    Struct {
        fields: Arc<Vec<StructField>>,
    },
    Mapping {
        key_kind: KeyKind,
        value: Arc<TypeDescriptor>,
    },
    /// A back-reference to an ancestor type that is still being built,
    /// produced only when a `mapping`'s value type or a `dynamic_array`'s
    /// element type resolves back to one of its own ancestors (e.g.
    /// `struct S { m: mapping(uint => S) }`). Holds a [`Weak`] rather than
    /// an [`Arc`] because the ancestor's `Arc` does not exist yet at the
    /// point the back-reference is created; by the time anyone decodes
    /// through it (`.at()`/`.index()`, always after ingestion finishes),
    /// the ancestor is fully built and alive via the cache or the
    /// enclosing `ContractBinding`, so the upgrade always succeeds.
    Recursive(Weak<TypeDescriptor>),
}

/// One field of a [`TypeDescriptor::Struct`], as assigned by the compiler's
/// packing rules: a slot offset relative to the struct's base slot, and a
/// bit offset within that slot.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub slot_offset: u64,
    pub bit_offset: u16,
    pub descriptor: Arc<TypeDescriptor>,
}

/// The kind of key a [`TypeDescriptor::Mapping`] is indexed by, used to
/// select the key-encoding rule in [`crate::decode::mapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Uint,
    Int,
    Address,
    FixedBytes,
    /// `string` or `bytes` keys: used at their natural length, unpadded.
    StringOrBytes,
}

impl TypeDescriptor {
    /// Bit width of a scalar (non-composite, non-dynamic) type: the width
    /// the primitive decoder masks out of a single fetched word. `None` for
    /// every composite or dynamic variant, which have their own packing
    /// rules in `crate::decode` instead of a single scalar width.
    pub fn bit_width(&self) -> Option<u16> {
        match self {
            TypeDescriptor::Int(n) | TypeDescriptor::Uint(n) => Some(*n),
            TypeDescriptor::Bool => Some(8),
            TypeDescriptor::Address => Some(160),
            TypeDescriptor::FixedBytes(n) => Some(n * 8),
            TypeDescriptor::String
            | TypeDescriptor::DynamicBytes
            | TypeDescriptor::DynamicArray { .. }
            | TypeDescriptor::Mapping { .. }
            | TypeDescriptor::FixedArray { .. }
            | TypeDescriptor::Struct { .. } => None,
            TypeDescriptor::Recursive(weak) => weak.upgrade().and_then(|d| d.bit_width()),
        }
    }

    /// `true` for types whose root always occupies an entire slot at
    /// `bit_offset == 0` regardless of what the layout document says.
    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeDescriptor::String
            | TypeDescriptor::DynamicBytes
            | TypeDescriptor::DynamicArray { .. }
            | TypeDescriptor::Mapping { .. } => true,
            TypeDescriptor::Recursive(weak) => {
                weak.upgrade().is_some_and(|d| d.is_dynamic())
            }
            _ => false,
        }
    }

    /// Canonical Solidity-style label, e.g. `uint256`, `int8`, `bytes32`,
    /// `T[N]`, `T[]`, `mapping(K => V)`, `struct`. Used by
    /// [`crate::ContractBinding::list_variables`].
    pub fn canonical_label(&self) -> String {
        match self {
            TypeDescriptor::Int(n) => format!("int{n}"),
            TypeDescriptor::Uint(n) => format!("uint{n}"),
            TypeDescriptor::Bool => "bool".to_string(),
            TypeDescriptor::Address => "address".to_string(),
            TypeDescriptor::FixedBytes(n) => format!("bytes{n}"),
            TypeDescriptor::String => "string".to_string(),
            TypeDescriptor::DynamicBytes => "bytes".to_string(),
            TypeDescriptor::FixedArray { unit, len } => {
                format!("{}[{}]", unit.canonical_label(), len)
            }
            TypeDescriptor::DynamicArray { unit } => format!("{}[]", unit.canonical_label()),
            TypeDescriptor::Struct { .. } => "struct".to_string(),
            TypeDescriptor::Mapping { key_kind, value } => {
                format!(
                    "mapping({} => {})",
                    key_kind.canonical_label(),
                    value.canonical_label()
                )
            }
            TypeDescriptor::Recursive(weak) => match weak.upgrade() {
                Some(d) => d.canonical_label(),
                None => "<dangling recursive type>".to_string(),
            },
        }
    }
}

impl KeyKind {
    fn canonical_label(self) -> &'static str {
        match self {
            KeyKind::Uint => "uint256",
            KeyKind::Int => "int256",
            KeyKind::Address => "address",
            KeyKind::FixedBytes => "bytes32",
            KeyKind::StringOrBytes => "string",
        }
    }
}

/// `1 + max(slot_offset_within_struct)`: the number of slots a struct
/// instance occupies. Used by array-of-struct and mapping-of-struct
/// decoders to step between elements.
pub fn struct_slot_footprint(fields: &[StructField]) -> u64 {
    1 + fields.iter().map(|f| f.slot_offset).max().unwrap_or(0)
}
