//! # Typed value access
//!
//! The accessor boundary between the container views and whatever actually
//! owns the inspected process's memory. Everything above this module
//! consumes [`Value`] and nothing else: a view never performs pointer
//! arithmetic that the accessor has not sanctioned, and it never learns
//! whether the bytes came from a live process, a core file, or a test
//! image.
//!
//! All operations are fallible because debuggee memory may be unmapped and
//! declared types may be lies. A failed operation yields `None` (or the
//! caller-supplied default for numeric reads), and every consumer is
//! required to treat that as "unknown", not as zero, and never as a reason
//! to fault.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::types::Address;

/// Size of a debuggee pointer in bytes. Only 64-bit images are supported.
pub const POINTER_SIZE: u64 = 8;

/// Description of a debuggee type
///
/// Carries the facts the views are allowed to rely on: a declared name, a
/// byte size, named fields with offsets, template arguments, and the
/// pointee for pointer types. Cheap to clone; the payload is shared.
///
/// Node types in linked structures refer back to themselves through their
/// link fields. Those are modeled the way debug information models a
/// forward declaration: build the pointer with [`TypeInfo::deferred_pointer`]
/// first and supply the pointee once the node type exists.
#[derive(Clone)]
pub struct TypeInfo
{
    inner: Arc<TypeData>,
}

#[derive(Clone)]
struct TypeData
{
    name: String,
    byte_size: u64,
    fields: Vec<Field>,
    template_args: Vec<TypeInfo>,
    pointee: OnceCell<TypeInfo>,
    referent: Option<TypeInfo>,
    is_pointer: bool,
}

/// A named field within a structured type.
#[derive(Clone)]
pub struct Field
{
    /// Field name as declared in the debuggee.
    pub name: String,
    /// Byte offset of the field within its enclosing type.
    pub offset: u64,
    /// Declared type of the field.
    pub ty: TypeInfo,
}

impl Field
{
    /// Create a field record.
    pub fn new(name: impl Into<String>, offset: u64, ty: TypeInfo) -> Self
    {
        Self {
            name: name.into(),
            offset,
            ty,
        }
    }
}

impl TypeInfo
{
    fn from_data(data: TypeData) -> Self
    {
        Self {
            inner: Arc::new(data),
        }
    }

    /// A leaf type with no fields: integers, characters, raw buffers.
    pub fn scalar(name: impl Into<String>, byte_size: u64) -> Self
    {
        Self::from_data(TypeData {
            name: name.into(),
            byte_size,
            fields: Vec::new(),
            template_args: Vec::new(),
            pointee: OnceCell::new(),
            referent: None,
            is_pointer: false,
        })
    }

    /// A structured type with named fields at fixed offsets.
    pub fn structure(name: impl Into<String>, byte_size: u64, fields: Vec<Field>) -> Self
    {
        Self::from_data(TypeData {
            name: name.into(),
            byte_size,
            fields,
            template_args: Vec::new(),
            pointee: OnceCell::new(),
            referent: None,
            is_pointer: false,
        })
    }

    /// A pointer to a known pointee type.
    pub fn pointer(pointee: TypeInfo) -> Self
    {
        Self::from_data(TypeData {
            name: format!("{} *", pointee.name()),
            byte_size: POINTER_SIZE,
            fields: Vec::new(),
            template_args: Vec::new(),
            pointee: OnceCell::with_value(pointee),
            referent: None,
            is_pointer: true,
        })
    }

    /// A pointer whose pointee is supplied later via [`TypeInfo::set_pointee`].
    ///
    /// Needed for self-referential node types (a list node's `next` field
    /// points at another list node), mirroring how debug information leans
    /// on forward declarations for the same problem.
    pub fn deferred_pointer(name: impl Into<String>) -> Self
    {
        Self::from_data(TypeData {
            name: name.into(),
            byte_size: POINTER_SIZE,
            fields: Vec::new(),
            template_args: Vec::new(),
            pointee: OnceCell::new(),
            referent: None,
            is_pointer: true,
        })
    }

    /// A reference type; presented at the same address as its referent.
    pub fn reference(referent: TypeInfo) -> Self
    {
        Self::from_data(TypeData {
            name: format!("{} &", referent.name()),
            byte_size: POINTER_SIZE,
            fields: Vec::new(),
            template_args: Vec::new(),
            pointee: OnceCell::new(),
            referent: Some(referent),
            is_pointer: false,
        })
    }

    /// Attach template arguments, consuming and returning the type.
    #[must_use]
    pub fn with_template_args(self, args: Vec<TypeInfo>) -> Self
    {
        let mut data = (*self.inner).clone();
        data.template_args = args;
        Self::from_data(data)
    }

    /// Resolve a deferred pointer's pointee. Later calls are ignored.
    pub fn set_pointee(&self, pointee: TypeInfo)
    {
        let _ = self.inner.pointee.set(pointee);
    }

    /// Declared type name.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.inner.name
    }

    /// Size of one value of this type in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64
    {
        self.inner.byte_size
    }

    /// All declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field]
    {
        &self.inner.fields
    }

    /// Look up a field by name.
    pub fn field_named(&self, name: &str) -> Option<&Field>
    {
        self.inner.fields.iter().find(|field| field.name == name)
    }

    /// Template argument at `index`, if the type is a template instantiation.
    pub fn template_arg(&self, index: usize) -> Option<&TypeInfo>
    {
        self.inner.template_args.get(index)
    }

    /// Pointee type for pointers. `None` for non-pointers and for deferred
    /// pointers that were never resolved.
    pub fn pointee(&self) -> Option<&TypeInfo>
    {
        self.inner.pointee.get()
    }

    /// Whether this is a pointer type.
    #[must_use]
    pub fn is_pointer(&self) -> bool
    {
        self.inner.is_pointer
    }

    /// Whether this is a reference type.
    #[must_use]
    pub fn is_reference(&self) -> bool
    {
        self.inner.referent.is_some()
    }

    /// Strip any reference layers, yielding the underlying value type.
    #[must_use]
    pub fn strip_reference(&self) -> &TypeInfo
    {
        match &self.inner.referent {
            Some(referent) => referent.strip_reference(),
            None => self,
        }
    }
}

// Identity for debuggee types is the declared name plus size; a structural
// comparison would recurse forever through self-referential node types.
impl PartialEq for TypeInfo
{
    fn eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name && self.inner.byte_size == other.inner.byte_size)
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("TypeInfo")
            .field("name", &self.inner.name)
            .field("byte_size", &self.inner.byte_size)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Field
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("ty", &self.ty)
            .finish()
    }
}

impl fmt::Display for TypeInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Read-only handle to a typed value in debuggee memory
///
/// The accessor boundary consumed by every container view. Implementations
/// wrap a live debug session, a core file, or a captured
/// [`Snapshot`](crate::snapshot::Snapshot); the views cannot tell the
/// difference.
///
/// ## Contract
///
/// - Every operation is fallible and must never panic: an unreadable or
///   ill-typed value yields `None`, and callers treat that as *unknown*.
/// - Field access on a pointer- or reference-typed value reads through the
///   indirection first, matching the convention of host debugger APIs.
///   [`Value::child_at_offset`] does the same.
/// - Values must be treated as possibly stale between calls; implementations
///   must not cache raw memory across debuggee execution.
pub trait Value: Clone
{
    /// Name of this value, e.g. a field name or a synthesized `[3]`.
    fn name(&self) -> &str;

    /// Declared type of this value.
    fn type_info(&self) -> Option<TypeInfo>;

    /// Address of this value in debuggee memory. Synthesized byte-backed
    /// values have none.
    fn address(&self) -> Option<Address>;

    /// Named sub-field of this value, reading through pointers and
    /// references as needed.
    fn field(&self, name: &str) -> Option<Self>;

    /// This value's bytes interpreted as a little-endian unsigned integer,
    /// or `default` when the bytes cannot be read.
    fn value_as_unsigned(&self, default: u64) -> u64;

    /// Raw bytes starting at this value's location.
    fn raw_bytes(&self, len: usize) -> Option<Vec<u8>>;

    /// The value this pointer points at. `None` for non-pointers and null
    /// or unreadable pointers.
    fn deref(&self) -> Option<Self>;

    /// A new named value of type `ty` located `offset` bytes past this
    /// value (past its pointee, for pointer values).
    fn child_at_offset(&self, name: &str, offset: u64, ty: &TypeInfo) -> Option<Self>;

    /// A new named value synthesized from copied bytes. The result has no
    /// address of its own.
    fn value_from_bytes(&self, name: &str, bytes: &[u8], ty: &TypeInfo) -> Option<Self>;
}
