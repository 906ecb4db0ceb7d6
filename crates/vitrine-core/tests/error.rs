//! Tests for accessor-layer error reporting

use vitrine_core::{Address, VitrineError};

#[test]
fn test_unmapped_memory_display()
{
    let error = VitrineError::UnmappedMemory {
        address: Address::new(0x1000),
        len: 16,
    };
    let message = format!("{}", error);
    assert!(message.contains("16 bytes"));
    assert!(message.contains("0x0000000000001000"));
}

#[test]
fn test_unknown_field_display()
{
    let error = VitrineError::UnknownField {
        type_name: "std::__1::vector<int>".to_string(),
        field: "__begin_".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("std::__1::vector<int>"));
    assert!(message.contains("__begin_"));
}

#[test]
fn test_not_a_pointer_display()
{
    let error = VitrineError::NotAPointer("unsigned int".to_string());
    let message = format!("{}", error);
    assert!(message.contains("dereference"));
    assert!(message.contains("unsigned int"));
}

#[test]
fn test_truncated_image_display()
{
    let error = VitrineError::TruncatedImage {
        type_name: "pair".to_string(),
        needed: 16,
        available: 3,
    };
    let message = format!("{}", error);
    assert!(message.contains("16"));
    assert!(message.contains("3"));
}
