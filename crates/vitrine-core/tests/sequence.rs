//! Dynamic array view tests against snapshot images.

mod common;

use std::sync::Arc;

use common::{map_u32s, u32_type, value_at, write_vector_header};
use vitrine_core::views::SequenceView;
use vitrine_core::{layouts, Snapshot, SnapshotValue, Value, ViewConfig};

const VEC_ADDR: u64 = 0x100;
const DATA_ADDR: u64 = 0x1000;

fn attach(snapshot: Snapshot, config: ViewConfig) -> SequenceView<SnapshotValue>
{
    let ty = layouts::sequence_of(&u32_type());
    let value = value_at(Arc::new(snapshot), "numbers", VEC_ADDR, &ty);
    let mut view = SequenceView::new(value, config);
    view.update();
    view
}

#[test]
fn test_three_element_vector_roundtrip()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 12, DATA_ADDR + 16);
    map_u32s(&mut snapshot, DATA_ADDR, &[7, 8, 9]);

    let view = attach(snapshot, ViewConfig::default());
    assert_eq!(view.child_count(), 3);

    let child = view.child_at(1).expect("element 1");
    assert_eq!(child.name(), "[1]");
    assert_eq!(child.address().unwrap().value(), DATA_ADDR + 4);
    assert_eq!(child.value_as_unsigned(0), 8);
    assert_eq!(view.child_at(2).unwrap().value_as_unsigned(0), 9);
    assert_eq!(view.summary(), "size=3");
}

#[test]
fn test_empty_when_start_equals_finish()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR, DATA_ADDR);

    let view = attach(snapshot, ViewConfig::default());
    assert_eq!(view.child_count(), 0);
    assert!(view.child_at(0).is_none());
}

#[test]
fn test_empty_when_range_inverted()
{
    let mut snapshot = Snapshot::new();
    // start > finish: the header of a vector mid-construction.
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR + 64, DATA_ADDR, DATA_ADDR);

    let view = attach(snapshot, ViewConfig::default());
    assert_eq!(view.child_count(), 0);
}

#[test]
fn test_empty_when_bounds_are_null()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, 0, DATA_ADDR, DATA_ADDR);
    assert_eq!(attach(snapshot, ViewConfig::default()).child_count(), 0);

    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, 0, 0);
    assert_eq!(attach(snapshot, ViewConfig::default()).child_count(), 0);
}

#[test]
fn test_empty_when_span_not_multiple_of_element_size()
{
    let mut snapshot = Snapshot::new();
    // Six bytes of u32s is a torn header, not one and a half elements.
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 6, DATA_ADDR + 6);

    let view = attach(snapshot, ViewConfig::default());
    assert_eq!(view.child_count(), 0);
}

#[test]
fn test_count_capped_at_display_cap()
{
    let mut snapshot = Snapshot::new();
    // 1000 elements; the view must stop counting at the cap.
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 4000, DATA_ADDR + 4000);
    map_u32s(&mut snapshot, DATA_ADDR, &[1; 1000]);

    let view = attach(snapshot, ViewConfig::default());
    assert_eq!(view.child_count(), 255);
    assert!(view.child_at(254).is_some());
    assert!(view.child_at(255).is_none());
}

#[test]
fn test_update_is_idempotent()
{
    let mut snapshot = Snapshot::new();
    write_vector_header(&mut snapshot, VEC_ADDR, DATA_ADDR, DATA_ADDR + 8, DATA_ADDR + 8);
    map_u32s(&mut snapshot, DATA_ADDR, &[5, 6]);

    let mut view = attach(snapshot, ViewConfig::default());
    let first = (view.child_count(), view.child_at(1).unwrap().value_as_unsigned(0));
    view.update();
    view.update();
    let second = (view.child_count(), view.child_at(1).unwrap().value_as_unsigned(0));
    assert_eq!(first, second);
}
