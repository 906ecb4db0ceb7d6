//! # libc++ layout catalog
//!
//! Canonical [`TypeInfo`] descriptions of the libc++ container layouts the
//! views decode. A live debug session derives these from debug information;
//! snapshot images usually have none, so this module spells the layouts out
//! once instead of letting every caller hand-build field tables.
//!
//! Offsets follow the OS X-era libc++ ABI the engine targets: 8-byte
//! pointers, little-endian, node links first, payload last. Composite
//! payloads are packed in declaration order with no padding, so callers
//! should stick to naturally aligned element sizes.

use crate::value::{Field, TypeInfo};

/// `char`.
#[must_use]
pub fn char_type() -> TypeInfo
{
    TypeInfo::scalar("char", 1)
}

/// The fixed-width unsigned integer of `byte_size` bytes.
#[must_use]
pub fn unsigned_type(byte_size: u64) -> TypeInfo
{
    let name = match byte_size {
        1 => "unsigned char",
        2 => "unsigned short",
        4 => "unsigned int",
        _ => "unsigned long",
    };
    TypeInfo::scalar(name, byte_size)
}

/// `std::__1::pair<First, Second>`, packed in declaration order.
#[must_use]
pub fn pair_of(first: &TypeInfo, second: &TypeInfo) -> TypeInfo
{
    let byte_size = first.byte_size() + second.byte_size();
    TypeInfo::structure(
        format!("std::__1::pair<{}, {}>", first.name(), second.name()),
        byte_size,
        vec![
            Field::new("first", 0, first.clone()),
            Field::new("second", first.byte_size(), second.clone()),
        ],
    )
}

/// `std::__1::vector<T>`: `__begin_`/`__end_` element range plus the
/// compressed capacity pair whose `__first_` member is the one field whose
/// declared type is reliably `T *`.
#[must_use]
pub fn sequence_of(element: &TypeInfo) -> TypeInfo
{
    let elem_ptr = TypeInfo::pointer(element.clone());
    let cap_pair = TypeInfo::structure(
        format!("std::__1::__compressed_pair<{} *, std::__1::allocator<{}> >", element.name(), element.name()),
        8,
        vec![Field::new("__first_", 0, elem_ptr.clone())],
    );
    TypeInfo::structure(
        format!(
            "std::__1::vector<{}, std::__1::allocator<{}> >",
            element.name(),
            element.name()
        ),
        24,
        vec![
            Field::new("__begin_", 0, elem_ptr.clone()),
            Field::new("__end_", 8, elem_ptr),
            Field::new("__end_cap_", 16, cap_pair),
        ],
    )
    .with_template_args(vec![element.clone()])
}

/// The types making up one `std::__1::list<T>` instantiation.
#[derive(Debug, Clone)]
pub struct ListLayout
{
    /// The list type itself.
    pub container: TypeInfo,
    /// A full list node: `__prev_`, `__next_`, `__value_`.
    pub node: TypeInfo,
    /// Pointer-to-node, shared by every link field.
    pub node_pointer: TypeInfo,
}

/// `std::__1::list<T>`: a sentinel node embedded in the header, circularly
/// linked full nodes elsewhere. The payload sits 16 bytes into a node.
#[must_use]
pub fn list_of(element: &TypeInfo) -> ListLayout
{
    let node_name = format!("std::__1::__list_node<{}>", element.name());
    let node_pointer = TypeInfo::deferred_pointer(format!("{node_name} *"));
    let node = TypeInfo::structure(
        node_name,
        16 + element.byte_size(),
        vec![
            Field::new("__prev_", 0, node_pointer.clone()),
            Field::new("__next_", 8, node_pointer.clone()),
            Field::new("__value_", 16, element.clone()),
        ],
    );
    node_pointer.set_pointee(node.clone());

    let sentinel = TypeInfo::structure(
        format!("std::__1::__list_node_base<{}>", element.name()),
        16,
        vec![
            Field::new("__prev_", 0, node_pointer.clone()),
            Field::new("__next_", 8, node_pointer.clone()),
        ],
    );
    let container = TypeInfo::structure(
        format!(
            "std::__1::list<{}, std::__1::allocator<{}> >",
            element.name(),
            element.name()
        ),
        24,
        vec![
            Field::new("__end_", 0, sentinel),
            Field::new("__size_alloc_", 16, unsigned_type(8)),
        ],
    )
    .with_template_args(vec![element.clone()]);

    ListLayout {
        container,
        node,
        node_pointer,
    }
}

/// The types making up one `std::__1::map<K, V>` instantiation.
#[derive(Debug, Clone)]
pub struct MapLayout
{
    /// The map type itself.
    pub container: TypeInfo,
    /// A full tree node: `__left_`, `__right_`, `__parent_`, `__value_`.
    pub node: TypeInfo,
    /// Pointer-to-node, shared by every link field.
    pub node_pointer: TypeInfo,
    /// The `pair<K, V>` payload type.
    pub element: TypeInfo,
}

/// `std::__1::map<K, V>`: a red-black tree header holding the cached
/// leftmost node, the end node, and the element counter. The payload sits
/// 24 bytes into a node, after the three links.
#[must_use]
pub fn map_of(key: &TypeInfo, value: &TypeInfo) -> MapLayout
{
    let element = pair_of(key, value);
    let node_name = format!("std::__1::__tree_node<{}, void *>", element.name());
    let node_pointer = TypeInfo::deferred_pointer(format!("{node_name} *"));
    let node = TypeInfo::structure(
        node_name,
        24 + element.byte_size(),
        vec![
            Field::new("__left_", 0, node_pointer.clone()),
            Field::new("__right_", 8, node_pointer.clone()),
            Field::new("__parent_", 16, node_pointer.clone()),
            Field::new("__value_", 24, element.clone()),
        ],
    );
    node_pointer.set_pointee(node.clone());

    let end_node = TypeInfo::structure(
        "std::__1::__tree_end_node<std::__1::__tree_node_base<void *> *>",
        8,
        vec![Field::new("__left_", 0, node_pointer.clone())],
    );
    let size_pair = TypeInfo::structure(
        "std::__1::__compressed_pair<unsigned long, std::__1::__map_value_compare>",
        8,
        vec![Field::new("__first_", 0, unsigned_type(8))],
    );
    let tree = TypeInfo::structure(
        format!("std::__1::__tree<{}>", element.name()),
        24,
        vec![
            Field::new("__begin_node_", 0, node_pointer.clone()),
            Field::new("__pair1_", 8, end_node),
            Field::new("__pair3_", 16, size_pair),
        ],
    );
    let container = TypeInfo::structure(
        format!("std::__1::map<{}, {}, std::__1::less<{}> >", key.name(), value.name(), key.name()),
        24,
        vec![Field::new("__tree_", 0, tree)],
    )
    .with_template_args(vec![key.clone(), value.clone()]);

    MapLayout {
        container,
        node,
        node_pointer,
        element,
    }
}

/// `std::__1::string`: the small-string-optimized union header, exposed as
/// two overlapping representations at offset 0. `__s.__size_` is the
/// one-byte layout discriminant.
#[must_use]
pub fn string_type() -> TypeInfo
{
    let short_rep = TypeInfo::structure(
        "std::__1::basic_string<char>::__short",
        24,
        vec![
            Field::new("__size_", 0, unsigned_type(1)),
            Field::new("__data_", 1, TypeInfo::scalar("char [23]", 23)),
        ],
    );
    let long_rep = TypeInfo::structure(
        "std::__1::basic_string<char>::__long",
        24,
        vec![
            Field::new("__cap_", 0, unsigned_type(8)),
            Field::new("__size_", 8, unsigned_type(8)),
            Field::new("__data_", 16, TypeInfo::pointer(char_type())),
        ],
    );
    TypeInfo::structure(
        "std::__1::string",
        24,
        vec![Field::new("__s", 0, short_rep), Field::new("__l", 0, long_rep)],
    )
    .with_template_args(vec![char_type()])
}
