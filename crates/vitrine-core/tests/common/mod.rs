//! Shared harness for the container view tests: byte-image writers that lay
//! out libc++ container headers and nodes inside a [`Snapshot`].

#![allow(dead_code)]

use std::sync::Arc;

use vitrine_core::{layouts, Address, Snapshot, SnapshotValue, TypeInfo};

pub fn u32_type() -> TypeInfo
{
    layouts::unsigned_type(4)
}

pub fn u64_type() -> TypeInfo
{
    layouts::unsigned_type(8)
}

/// Little-endian encode a run of 64-bit words.
pub fn words(values: &[u64]) -> Vec<u8>
{
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

pub fn map_words(snapshot: &mut Snapshot, addr: u64, values: &[u64])
{
    snapshot.map(Address::new(addr), words(values));
}

pub fn map_u32s(snapshot: &mut Snapshot, addr: u64, values: &[u32])
{
    let bytes = values.iter().flat_map(|value| value.to_le_bytes()).collect();
    snapshot.map(Address::new(addr), bytes);
}

pub fn value_at(snapshot: Arc<Snapshot>, name: &str, addr: u64, ty: &TypeInfo) -> SnapshotValue
{
    SnapshotValue::at(snapshot, name, Address::new(addr), ty.clone())
}

/// `vector` header: `__begin_`, `__end_`, and the capacity pointer.
pub fn write_vector_header(snapshot: &mut Snapshot, addr: u64, begin: u64, end: u64, cap: u64)
{
    map_words(snapshot, addr, &[begin, end, cap]);
}

/// `list` header: the embedded sentinel (`__prev_`, `__next_`) plus the
/// size/alloc word the view never trusts.
pub fn write_list_header(snapshot: &mut Snapshot, addr: u64, prev: u64, next: u64)
{
    map_words(snapshot, addr, &[prev, next, 0]);
}

/// `list<unsigned long>` node: `__prev_`, `__next_`, payload.
pub fn write_list_node(snapshot: &mut Snapshot, addr: u64, prev: u64, next: u64, value: u64)
{
    map_words(snapshot, addr, &[prev, next, value]);
}

/// `map` header: `__begin_node_`, the end node's `__left_` (the root), and
/// the element counter.
pub fn write_map_header(snapshot: &mut Snapshot, addr: u64, begin: u64, root: u64, size: u64)
{
    map_words(snapshot, addr, &[begin, root, size]);
}

/// `map<unsigned long, unsigned long>` tree node: `__left_`, `__right_`,
/// `__parent_`, then the key/value pair payload.
pub fn write_tree_node(snapshot: &mut Snapshot, addr: u64, left: u64, right: u64, parent: u64, key: u64, value: u64)
{
    map_words(snapshot, addr, &[left, right, parent, key, value]);
}
