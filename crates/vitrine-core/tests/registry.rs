//! Attach-time dispatch tests: type-name matching, the tagged view union,
//! and the child-name contract.

mod common;

use std::sync::Arc;

use common::{map_u32s, u32_type, u64_type, value_at, write_list_header, write_list_node, write_vector_header};
use vitrine_core::{
    child_index_from_name, default_registry, layouts, ContainerKind, Snapshot, Value, ViewConfig,
};

const VEC_ADDR: u64 = 0x100;
const LIST_ADDR: u64 = 0x180;
const STR_ADDR: u64 = 0x300;
const DATA_ADDR: u64 = 0x1000;

#[test]
fn test_attach_selects_sequence_view_by_type_name()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 12, DATA_ADDR + 16);
    map_u32s(&mut snapshot, DATA_ADDR, &[7, 8, 9]);

    let value = value_at(Arc::new(snapshot), "v", VEC_ADDR, &layouts::sequence_of(&u32_type()));
    let mut view = default_registry()
        .attach(value, ViewConfig::default())
        .expect("vector should attach");

    assert_eq!(view.kind(), ContainerKind::Sequence);
    assert_eq!(view.child_count(), 3);
    assert_eq!(view.summary(), "size=3");
    assert_eq!(view.child_at(1).unwrap().value_as_unsigned(0), 8);
}

#[test]
fn test_attach_selects_list_view_and_names_children()
{
    let mut snapshot = Snapshot::new();
    let (a, b) = (0x1000, 0x1040);
    write_list_header(&mut snapshot, LIST_ADDR, b, a);
    write_list_node(&mut snapshot, a, LIST_ADDR, b, 10);
    write_list_node(&mut snapshot, b, a, LIST_ADDR, 20);

    let layout = layouts::list_of(&u64_type());
    let value = value_at(Arc::new(snapshot), "l", LIST_ADDR, &layout.container);
    let mut view = default_registry()
        .attach(value, ViewConfig::default())
        .expect("list should attach");

    assert_eq!(view.kind(), ContainerKind::List);
    let child = view.child_at(1).expect("element 1");
    assert_eq!(child.name(), "[1]");
    assert_eq!(child_index_from_name(child.name()), Some(1));
}

#[test]
fn test_attach_selects_string_summary()
{
    let mut snapshot = Snapshot::new();
    let mut bytes = vec![0u8; 24];
    bytes[0] = 2 << 1;
    bytes[1..3].copy_from_slice(b"hi");
    snapshot.map(vitrine_core::Address::new(STR_ADDR), bytes);

    let value = value_at(Arc::new(snapshot), "s", STR_ADDR, &layouts::string_type());
    let mut view = default_registry()
        .attach(value, ViewConfig::default())
        .expect("string should attach");

    assert_eq!(view.kind(), ContainerKind::String);
    assert_eq!(view.summary(), "\"hi\"");
    assert_eq!(view.child_count(), 0);
}

#[test]
fn test_attach_rejects_unregistered_types()
{
    let snapshot = Arc::new(Snapshot::new());
    let value = value_at(snapshot, "n", 0x10, &u32_type());
    assert!(default_registry().attach(value, ViewConfig::default()).is_none());
}

#[test]
fn test_attach_respects_per_view_config()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 400, DATA_ADDR + 400);
    map_u32s(&mut snapshot, DATA_ADDR, &[0; 100]);
    let snapshot = Arc::new(snapshot);

    let ty = layouts::sequence_of(&u32_type());
    let mut capped = default_registry()
        .attach(value_at(snapshot.clone(), "v", VEC_ADDR, &ty), ViewConfig::default().with_display_cap(10))
        .unwrap();
    let mut uncapped = default_registry()
        .attach(value_at(snapshot, "v", VEC_ADDR, &ty), ViewConfig::default())
        .unwrap();

    // The cap is per-view state, not a process-wide knob.
    assert_eq!(capped.child_count(), 10);
    assert_eq!(uncapped.child_count(), 100);
}

#[test]
fn test_view_update_is_idempotent_across_queries()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 8, DATA_ADDR + 8);
    map_u32s(&mut snapshot, DATA_ADDR, &[1, 2]);

    let value = value_at(Arc::new(snapshot), "v", VEC_ADDR, &layouts::sequence_of(&u32_type()));
    let mut view = default_registry().attach(value, ViewConfig::default()).unwrap();

    let before = (view.child_count(), view.child_at(0).unwrap().value_as_unsigned(0));
    view.update();
    view.update();
    let after = (view.child_count(), view.child_at(0).unwrap().value_as_unsigned(0));
    assert_eq!(before, after);
}
