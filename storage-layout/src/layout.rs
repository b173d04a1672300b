// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Parses the JSON document the Solidity compiler emits under
//! `--storage-layout` (`{"storage": [...], "types": {...}}`) into
//! [`TypeDescriptor`] graphs, mirroring the resolution algorithm of §4.6.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use alloy_primitives::U256;
use regex::Regex;
use serde::Deserialize;

use crate::descriptor::{KeyKind, StructField, TypeDescriptor};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct StorageLayoutDoc {
    pub storage: Vec<StorageEntry>,
    pub types: HashMap<String, StorageTypeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StorageEntry {
    #[serde(default, rename = "astId")]
    pub ast_id: Option<u64>,
    #[serde(default)]
    pub contract: Option<String>,
    pub label: String,
    #[serde(default)]
    pub offset: u64,
    pub slot: String,
    #[serde(rename = "type")]
    pub type_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StorageTypeEntry {
    #[serde(default)]
    pub base: Option<String>,
    pub encoding: String,
    pub label: String,
    #[serde(default)]
    pub members: Option<Vec<StorageEntry>>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "numberOfBytes")]
    pub number_of_bytes: Option<String>,
}

/// One ingested root variable: its descriptor plus its `(slot, bit_offset)`
/// location within the contract.
pub(crate) struct ResolvedVariable {
    pub name: String,
    pub descriptor: Arc<TypeDescriptor>,
    pub slot: U256,
    pub bit_offset: u16,
}

/// Resolves every top-level entry of a parsed storage-layout document.
/// Memoizes type-id -> descriptor so that a type referenced from multiple
/// places (e.g. the same struct used in two array fields) is only resolved
/// once; detects — and rejects with a [`Error::Layout`] rather than
/// recursing forever — genuinely self-referential type-ids.
pub(crate) fn resolve(doc: &StorageLayoutDoc) -> Result<Vec<ResolvedVariable>> {
    let mut cache: HashMap<String, Arc<TypeDescriptor>> = HashMap::new();
    let mut stack: Vec<(String, Weak<TypeDescriptor>)> = Vec::new();

    let mut resolved = Vec::with_capacity(doc.storage.len());
    for entry in &doc.storage {
        let descriptor = resolve_type(&entry.type_id, doc, &mut cache, &mut stack)?;
        let slot = parse_slot(&entry.slot)?;
        let bit_offset = (entry.offset * 8) as u16;
        log::debug!(
            "resolved variable {:?}: {} at slot {slot}+{bit_offset}",
            entry.label,
            descriptor.canonical_label()
        );
        resolved.push(ResolvedVariable {
            name: entry.label.clone(),
            descriptor,
            slot,
            bit_offset,
        });
    }
    Ok(resolved)
}

fn parse_slot(slot: &str) -> Result<U256> {
    U256::from_str_radix(slot, 10)
        .map_err(|e| Error::layout(format!("invalid slot index {slot:?}: {e}")))
}

/// Resolves `type_id`, rejecting any cycle (a type that directly contains
/// itself with no dynamic indirection — e.g. a `FixedArray` whose element
/// type is itself) as a [`Error::Layout`].
fn resolve_type(
    type_id: &str,
    doc: &StorageLayoutDoc,
    cache: &mut HashMap<String, Arc<TypeDescriptor>>,
    stack: &mut Vec<(String, Weak<TypeDescriptor>)>,
) -> Result<Arc<TypeDescriptor>> {
    resolve_type_inner(type_id, doc, cache, stack, false)
}

/// Resolves `type_id`, but if it is already an ancestor currently being
/// built — a cycle — returns a lazy [`TypeDescriptor::Recursive`]
/// back-reference instead of erroring. Only safe to call from a position
/// the decoder never eagerly follows during ingestion: a `mapping`'s value
/// type, or a `dynamic_array`'s element type. By the time either is
/// actually decoded (`.at()`/`.index()`), ingestion has long finished and
/// the ancestor's `Arc` is alive, so the back-reference always upgrades.
fn resolve_type_cyclic(
    type_id: &str,
    doc: &StorageLayoutDoc,
    cache: &mut HashMap<String, Arc<TypeDescriptor>>,
    stack: &mut Vec<(String, Weak<TypeDescriptor>)>,
) -> Result<Arc<TypeDescriptor>> {
    resolve_type_inner(type_id, doc, cache, stack, true)
}

fn resolve_type_inner(
    type_id: &str,
    doc: &StorageLayoutDoc,
    cache: &mut HashMap<String, Arc<TypeDescriptor>>,
    stack: &mut Vec<(String, Weak<TypeDescriptor>)>,
    allow_cycle: bool,
) -> Result<Arc<TypeDescriptor>> {
    if let Some(cached) = cache.get(type_id) {
        return Ok(cached.clone());
    }
    if let Some((_, weak)) = stack.iter().find(|(id, _)| id == type_id) {
        if allow_cycle {
            log::debug!("resolved {type_id:?} as a lazy back-reference to an ancestor type");
            return Ok(Arc::new(TypeDescriptor::Recursive(weak.clone())));
        }
        log::warn!("cyclic type reference detected at {type_id:?}");
        return Err(Error::layout(format!(
            "cyclic type graph detected at type-id {type_id:?}; \
             a type that directly contains itself with no dynamic \
             indirection cannot be represented"
        )));
    }

    let entry = doc
        .types
        .get(type_id)
        .ok_or_else(|| Error::layout(format!("unresolved type-id {type_id:?}")))?;

    let type_id_owned = type_id.to_string();
    let mut build_err: Option<Error> = None;
    let descriptor = Arc::new_cyclic(|weak: &Weak<TypeDescriptor>| {
        stack.push((type_id_owned, weak.clone()));
        let result = build_descriptor(type_id, entry, doc, cache, stack);
        stack.pop();
        match result {
            Ok(d) => d,
            // `Arc::new_cyclic`'s closure cannot return a `Result`; stash
            // the error and hand back a throwaway value that's discarded
            // the instant we see `build_err` is set below.
            Err(e) => {
                build_err = Some(e);
                TypeDescriptor::Bool
            }
        }
    });
    if let Some(e) = build_err {
        return Err(e);
    }

    cache.insert(type_id.to_string(), descriptor.clone());
    Ok(descriptor)
}

fn build_descriptor(
    type_id: &str,
    entry: &StorageTypeEntry,
    doc: &StorageLayoutDoc,
    cache: &mut HashMap<String, Arc<TypeDescriptor>>,
    stack: &mut Vec<(String, Weak<TypeDescriptor>)>,
) -> Result<TypeDescriptor> {
    match entry.encoding.as_str() {
        "bytes" => {
            if entry.label == "bytes" {
                Ok(TypeDescriptor::DynamicBytes)
            } else {
                Ok(TypeDescriptor::String)
            }
        }

        "mapping" => {
            let key_id = entry
                .key
                .as_deref()
                .ok_or_else(|| Error::layout(format!("mapping type {type_id:?} missing key")))?;
            let value_id = entry.value.as_deref().ok_or_else(|| {
                Error::layout(format!("mapping type {type_id:?} missing value"))
            })?;
            let key_descriptor = resolve_type(key_id, doc, cache, stack)?;
            // A mapping's value is never eagerly decoded, so a value type
            // that resolves back to an ancestor (e.g. a struct containing a
            // mapping to itself) is representable, not a layout error.
            let value_descriptor = resolve_type_cyclic(value_id, doc, cache, stack)?;
            let key_kind = key_kind_of(&key_descriptor)?;
            Ok(TypeDescriptor::Mapping {
                key_kind,
                value: value_descriptor,
            })
        }

        "dynamic_array" => {
            let base_id = entry.base.as_deref().ok_or_else(|| {
                Error::layout(format!("dynamic_array type {type_id:?} missing base"))
            })?;
            // Same reasoning as the mapping case: a dynamic array's element
            // slot is only ever computed on `.index()`, never eagerly.
            let unit = resolve_type_cyclic(base_id, doc, cache, stack)?;
            Ok(TypeDescriptor::DynamicArray { unit })
        }

        "inplace" => build_inplace(type_id, entry, doc, cache, stack),

        other => Err(Error::layout(format!(
            "unknown encoding {other:?} for type-id {type_id:?}"
        ))),
    }
}

fn build_inplace(
    type_id: &str,
    entry: &StorageTypeEntry,
    doc: &StorageLayoutDoc,
    cache: &mut HashMap<String, Arc<TypeDescriptor>>,
    stack: &mut Vec<(String, Weak<TypeDescriptor>)>,
) -> Result<TypeDescriptor> {
    if let Some(base_id) = &entry.base {
        let array_re = Regex::new(r"(.*)\[(\d+)\]$").expect("static regex is valid");
        let caps = array_re.captures(&entry.label).ok_or_else(|| {
            Error::layout(format!(
                "inplace array type {type_id:?} has unparseable label {:?}",
                entry.label
            ))
        })?;
        let len: u64 = caps[2]
            .parse()
            .map_err(|e| Error::layout(format!("invalid array length in {:?}: {e}", entry.label)))?;
        // A fixed array's elements are packed inline, not an indirection,
        // so a self-referential one truly has no finite representation.
        let unit = resolve_type(base_id, doc, cache, stack)?;
        return Ok(TypeDescriptor::FixedArray { unit, len });
    }

    let word_re = Regex::new(r"^(bytes|uint|int)(\d+)$").expect("static regex is valid");
    if let Some(caps) = word_re.captures(&entry.label) {
        let n: u16 = caps[2]
            .parse()
            .map_err(|e| Error::layout(format!("invalid width in {:?}: {e}", entry.label)))?;
        return Ok(match &caps[1] {
            "bytes" => TypeDescriptor::FixedBytes(n),
            "uint" => TypeDescriptor::Uint(n),
            "int" => TypeDescriptor::Int(n),
            _ => unreachable!(),
        });
    }

    if entry.label == "bool" {
        return Ok(TypeDescriptor::Bool);
    }
    if entry.label == "address" {
        return Ok(TypeDescriptor::Address);
    }
    if entry.label.starts_with("enum") {
        let bytes: u16 = entry
            .number_of_bytes
            .as_deref()
            .ok_or_else(|| Error::layout(format!("enum type {type_id:?} missing numberOfBytes")))?
            .parse()
            .map_err(|e| Error::layout(format!("invalid numberOfBytes on {type_id:?}: {e}")))?;
        return Ok(TypeDescriptor::Uint(bytes * 8));
    }
    if entry.label.starts_with("struct") {
        let members = entry
            .members
            .as_ref()
            .ok_or_else(|| Error::layout(format!("struct type {type_id:?} missing members")))?;
        let mut fields = Vec::with_capacity(members.len());
        for member in members {
            let descriptor = resolve_type(&member.type_id, doc, cache, stack)?;
            let slot_offset = parse_slot(&member.slot)?;
            let slot_offset: u64 = slot_offset
                .try_into()
                .map_err(|_| Error::layout(format!("struct member slot overflow in {type_id:?}")))?;
            fields.push(StructField {
                name: member.label.clone(),
                slot_offset,
                bit_offset: (member.offset * 8) as u16,
                descriptor,
            });
        }
        return Ok(TypeDescriptor::Struct {
            fields: Arc::new(fields),
        });
    }

    Err(Error::layout(format!(
        "unrecognized inplace label {:?} for type-id {type_id:?}",
        entry.label
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<ResolvedVariable>> {
        let doc: StorageLayoutDoc = serde_json::from_str(json).unwrap();
        resolve(&doc)
    }

    #[test]
    fn resolves_scalars_bools_and_addresses() {
        let json = r#"{
            "storage": [
                {"astId": 1, "contract": "C", "label": "a", "offset": 0, "slot": "0", "type": "t_uint256"},
                {"astId": 2, "contract": "C", "label": "b", "offset": 0, "slot": "1", "type": "t_bool"},
                {"astId": 3, "contract": "C", "label": "c", "offset": 1, "slot": "1", "type": "t_address"}
            ],
            "types": {
                "t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"},
                "t_bool": {"encoding": "inplace", "label": "bool", "numberOfBytes": "1"},
                "t_address": {"encoding": "inplace", "label": "address", "numberOfBytes": "20"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].descriptor.canonical_label(), "uint256");
        assert_eq!(resolved[1].descriptor.canonical_label(), "bool");
        assert_eq!(resolved[2].bit_offset, 8);
    }

    #[test]
    fn bytes_encoding_disambiguates_string_vs_bytes_by_label() {
        let json = r#"{
            "storage": [
                {"label": "s", "offset": 0, "slot": "0", "type": "t_string"},
                {"label": "b", "offset": 0, "slot": "1", "type": "t_bytes"}
            ],
            "types": {
                "t_string": {"encoding": "bytes", "label": "string"},
                "t_bytes": {"encoding": "bytes", "label": "bytes"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        assert!(matches!(*resolved[0].descriptor, TypeDescriptor::String));
        assert!(matches!(*resolved[1].descriptor, TypeDescriptor::DynamicBytes));
    }

    #[test]
    fn fixed_array_parses_length_out_of_label() {
        let json = r#"{
            "storage": [
                {"label": "arr", "offset": 0, "slot": "0", "type": "t_array"}
            ],
            "types": {
                "t_array": {"encoding": "inplace", "label": "uint256[4]", "base": "t_uint256", "numberOfBytes": "128"},
                "t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        match &*resolved[0].descriptor {
            TypeDescriptor::FixedArray { unit, len } => {
                assert_eq!(*len, 4);
                assert!(matches!(**unit, TypeDescriptor::Uint(256)));
            }
            other => panic!("expected FixedArray, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_array_resolves_its_base() {
        let json = r#"{
            "storage": [
                {"label": "arr", "offset": 0, "slot": "0", "type": "t_dynarray"}
            ],
            "types": {
                "t_dynarray": {"encoding": "dynamic_array", "label": "uint256[]", "base": "t_uint256"},
                "t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        assert!(matches!(*resolved[0].descriptor, TypeDescriptor::DynamicArray { .. }));
        assert_eq!(resolved[0].descriptor.canonical_label(), "uint256[]");
    }

    #[test]
    fn mapping_resolves_key_kind_and_value() {
        let json = r#"{
            "storage": [
                {"label": "m", "offset": 0, "slot": "0", "type": "t_mapping"}
            ],
            "types": {
                "t_mapping": {"encoding": "mapping", "label": "mapping(uint256 => string)", "key": "t_uint256", "value": "t_string"},
                "t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"},
                "t_string": {"encoding": "bytes", "label": "string"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        match &*resolved[0].descriptor {
            TypeDescriptor::Mapping { key_kind, value } => {
                assert!(matches!(key_kind, KeyKind::Uint));
                assert!(matches!(**value, TypeDescriptor::String));
            }
            other => panic!("expected Mapping, got {other:?}"),
        }
    }

    #[test]
    fn struct_members_carry_slot_and_bit_offsets() {
        let json = r#"{
            "storage": [
                {"label": "s", "offset": 0, "slot": "0", "type": "t_struct"}
            ],
            "types": {
                "t_struct": {"encoding": "inplace", "label": "struct C.S", "numberOfBytes": "64", "members": [
                    {"astId": 1, "contract": "C", "label": "x", "offset": 0, "slot": "0", "type": "t_uint128"},
                    {"astId": 2, "contract": "C", "label": "y", "offset": 16, "slot": "0", "type": "t_uint128b"}
                ]},
                "t_uint128": {"encoding": "inplace", "label": "uint128", "numberOfBytes": "16"},
                "t_uint128b": {"encoding": "inplace", "label": "uint128", "numberOfBytes": "16"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        match &*resolved[0].descriptor {
            TypeDescriptor::Struct { fields } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].slot_offset, 0);
                assert_eq!(fields[1].bit_offset, 128);
            }
            other => panic!("expected Struct, got {other:?}"),
        }
    }

    #[test]
    fn enum_resolves_to_uint_of_matching_byte_width() {
        let json = r#"{
            "storage": [
                {"label": "e", "offset": 0, "slot": "0", "type": "t_enum"}
            ],
            "types": {
                "t_enum": {"encoding": "inplace", "label": "enum C.E", "numberOfBytes": "1"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        assert!(matches!(*resolved[0].descriptor, TypeDescriptor::Uint(8)));
    }

    #[test]
    fn unresolved_type_id_is_a_layout_error() {
        let json = r#"{
            "storage": [{"label": "a", "offset": 0, "slot": "0", "type": "t_missing"}],
            "types": {}
        }"#;
        assert!(parse(json).is_err());
    }

    #[test]
    fn directly_self_referential_type_is_rejected_not_looped_forever() {
        let json = r#"{
            "storage": [{"label": "a", "offset": 0, "slot": "0", "type": "t_cycle"}],
            "types": {
                "t_cycle": {"encoding": "inplace", "label": "uint256[1]", "base": "t_cycle"}
            }
        }"#;
        assert!(parse(json).is_err());
    }

    #[test]
    fn struct_containing_a_mapping_to_itself_resolves_via_recursive_back_reference() {
        let json = r#"{
            "storage": [{"label": "m", "offset": 0, "slot": "0", "type": "t_mapping_self"}],
            "types": {
                "t_mapping_self": {"encoding": "mapping", "label": "mapping(uint256 => struct C.S)", "key": "t_uint256", "value": "t_struct_s"},
                "t_struct_s": {"encoding": "inplace", "label": "struct C.S", "numberOfBytes": "32", "members": [
                    {"astId": 1, "contract": "C", "label": "m", "offset": 0, "slot": "0", "type": "t_mapping_self"}
                ]},
                "t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"}
            }
        }"#;
        let resolved = parse(json).unwrap();
        let TypeDescriptor::Mapping { value, .. } = &*resolved[0].descriptor else {
            panic!("expected Mapping, got {:?}", resolved[0].descriptor);
        };
        let TypeDescriptor::Struct { fields } = &**value else {
            panic!("expected Struct value, got {value:?}");
        };
        assert_eq!(fields.len(), 1);
        assert!(matches!(*fields[0].descriptor, TypeDescriptor::Recursive(_)));
        assert_eq!(fields[0].descriptor.canonical_label(), "mapping(uint256 => struct)");
    }

    #[test]
    fn resolution_is_idempotent_across_repeated_ingestion() {
        let json = r#"{
            "storage": [{"label": "a", "offset": 0, "slot": "0", "type": "t_uint256"}],
            "types": {"t_uint256": {"encoding": "inplace", "label": "uint256", "numberOfBytes": "32"}}
        }"#;
        let first = parse(json).unwrap();
        let second = parse(json).unwrap();
        assert_eq!(
            first[0].descriptor.canonical_label(),
            second[0].descriptor.canonical_label()
        );
    }
}

fn key_kind_of(descriptor: &TypeDescriptor) -> Result<KeyKind> {
    match descriptor {
        TypeDescriptor::Uint(_) => Ok(KeyKind::Uint),
        TypeDescriptor::Int(_) => Ok(KeyKind::Int),
        TypeDescriptor::Address => Ok(KeyKind::Address),
        TypeDescriptor::FixedBytes(_) => Ok(KeyKind::FixedBytes),
        TypeDescriptor::String | TypeDescriptor::DynamicBytes => Ok(KeyKind::StringOrBytes),
        other => Err(Error::layout(format!(
            "unsupported mapping key type {other:?}"
        ))),
    }
}
