//! # Snapshot-backed accessor
//!
//! A concrete implementation of the [`Value`] boundary over a captured byte
//! image. A [`Snapshot`] is a set of mapped segments (the interesting
//! slices of a debuggee's address space at one stop) and a
//! [`SnapshotValue`] is a typed window into it.
//!
//! This is the attachment point for post-mortem inspection and the target
//! every integration test drives. Reads that touch unmapped ranges fail
//! with [`VitrineError::UnmappedMemory`]; the `Value` implementation
//! surfaces those failures as `None`, exactly the way a live-process
//! accessor surfaces a faulted read.
//!
//! Images are little-endian with 8-byte pointers.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{VitrineError, VitrineResult};
use crate::types::Address;
use crate::value::{TypeInfo, Value, POINTER_SIZE};

/// A captured image of debuggee memory: disjoint byte segments keyed by
/// base address.
#[derive(Debug, Default)]
pub struct Snapshot
{
    segments: BTreeMap<u64, Vec<u8>>,
}

impl Snapshot
{
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Map a segment of bytes at `base`. Segments are expected to be
    /// disjoint; a segment re-mapped at the same base replaces the old one.
    pub fn map(&mut self, base: Address, bytes: Vec<u8>)
    {
        self.segments.insert(base.value(), bytes);
    }

    /// Read `len` bytes at `address`.
    ///
    /// The read must land entirely inside one mapped segment; anything else
    /// is reported as unmapped. Container corruption routinely produces
    /// wild pointers, so this is an expected failure, not an exceptional
    /// one.
    pub fn read(&self, address: Address, len: usize) -> VitrineResult<Vec<u8>>
    {
        if len == 0 {
            return Ok(Vec::new());
        }

        let unmapped = || VitrineError::UnmappedMemory { address, len };

        let (base, segment) = self
            .segments
            .range(..=address.value())
            .next_back()
            .ok_or_else(unmapped)?;

        let offset = (address.value() - base) as usize;
        let end = offset.checked_add(len).ok_or_else(unmapped)?;
        segment.get(offset..end).map(<[u8]>::to_vec).ok_or_else(unmapped)
    }

    /// Read a little-endian unsigned integer of `byte_size` bytes (at most
    /// eight) at `address`.
    pub fn read_unsigned(&self, address: Address, byte_size: u64) -> VitrineResult<u64>
    {
        let len = byte_size.min(POINTER_SIZE) as usize;
        let bytes = self.read(address, len)?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(buf))
    }
}

/// Where a [`SnapshotValue`]'s bytes live.
#[derive(Debug, Clone)]
enum Backing
{
    /// At an address inside the snapshot.
    Memory(Address),
    /// In a copied buffer owned by the value itself (synthesized values).
    Bytes(Arc<[u8]>),
}

/// A typed value inside a [`Snapshot`]; the snapshot accessor's
/// implementation of [`Value`].
#[derive(Debug, Clone)]
pub struct SnapshotValue
{
    snapshot: Arc<Snapshot>,
    name: String,
    ty: TypeInfo,
    backing: Backing,
}

impl SnapshotValue
{
    /// The root constructor: a named value of type `ty` at `address`.
    pub fn at(snapshot: Arc<Snapshot>, name: impl Into<String>, address: Address, ty: TypeInfo) -> Self
    {
        Self {
            snapshot,
            name: name.into(),
            ty,
            backing: Backing::Memory(address),
        }
    }

    fn read_own(&self, len: usize) -> Option<Vec<u8>>
    {
        match &self.backing {
            Backing::Memory(address) => match self.snapshot.read(*address, len) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    trace!(value = %self.name, %err, "snapshot read failed");
                    None
                }
            },
            Backing::Bytes(bytes) => bytes.get(..len).map(<[u8]>::to_vec),
        }
    }

    /// Dereference, ignoring reference layers on the declared type.
    fn deref_impl(&self) -> Option<Self>
    {
        let stripped = self.ty.strip_reference();
        if !stripped.is_pointer() {
            let err = VitrineError::NotAPointer(self.ty.name().to_string());
            trace!(value = %self.name, %err, "dereference failed");
            return None;
        }
        let pointee = stripped.pointee()?.clone();

        let raw = {
            let bytes = self.read_own(POINTER_SIZE as usize)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            u64::from_le_bytes(buf)
        };
        if raw == 0 {
            trace!(value = %self.name, "null pointer dereference");
            return None;
        }

        Some(Self {
            snapshot: self.snapshot.clone(),
            name: format!("*{}", self.name),
            ty: pointee,
            backing: Backing::Memory(Address::new(raw)),
        })
    }

    /// The value whose layout should be indexed for field access: the value
    /// itself, or its pointee when the declared type is a pointer or
    /// reference.
    fn storage(&self) -> Option<Self>
    {
        if self.ty.is_reference() {
            let mut value = self.clone();
            value.ty = self.ty.strip_reference().clone();
            return Some(value);
        }
        if self.ty.is_pointer() {
            return self.deref_impl();
        }
        Some(self.clone())
    }

    /// A sub-window `offset` bytes into this value, with a new name and type.
    fn subvalue(&self, name: &str, offset: u64, ty: TypeInfo) -> Option<Self>
    {
        let backing = match &self.backing {
            Backing::Memory(address) => Backing::Memory(address.checked_add(offset)?),
            Backing::Bytes(bytes) => {
                let start = usize::try_from(offset).ok()?;
                let end = start.checked_add(usize::try_from(ty.byte_size()).ok()?)?;
                Backing::Bytes(Arc::from(bytes.get(start..end)?))
            }
        };
        Some(Self {
            snapshot: self.snapshot.clone(),
            name: name.to_string(),
            ty,
            backing,
        })
    }
}

impl Value for SnapshotValue
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn type_info(&self) -> Option<TypeInfo>
    {
        Some(self.ty.clone())
    }

    fn address(&self) -> Option<Address>
    {
        match &self.backing {
            Backing::Memory(address) => Some(*address),
            Backing::Bytes(_) => None,
        }
    }

    fn field(&self, name: &str) -> Option<Self>
    {
        let base = self.storage()?;
        let Some(field) = base.ty.field_named(name) else {
            let err = VitrineError::UnknownField {
                type_name: base.ty.name().to_string(),
                field: name.to_string(),
            };
            trace!(value = %self.name, %err, "field lookup failed");
            return None;
        };
        let (offset, ty) = (field.offset, field.ty.clone());
        base.subvalue(name, offset, ty)
    }

    fn value_as_unsigned(&self, default: u64) -> u64
    {
        let len = self.ty.byte_size().min(POINTER_SIZE) as usize;
        if len == 0 {
            return default;
        }
        match self.read_own(len) {
            Some(bytes) => {
                let mut buf = [0u8; 8];
                buf[..bytes.len()].copy_from_slice(&bytes);
                u64::from_le_bytes(buf)
            }
            None => default,
        }
    }

    fn raw_bytes(&self, len: usize) -> Option<Vec<u8>>
    {
        self.read_own(len)
    }

    fn deref(&self) -> Option<Self>
    {
        self.deref_impl()
    }

    fn child_at_offset(&self, name: &str, offset: u64, ty: &TypeInfo) -> Option<Self>
    {
        let base = self.storage()?;
        base.subvalue(name, offset, ty.clone())
    }

    fn value_from_bytes(&self, name: &str, bytes: &[u8], ty: &TypeInfo) -> Option<Self>
    {
        let needed = usize::try_from(ty.byte_size()).ok()?;
        if bytes.len() < needed {
            let err = VitrineError::TruncatedImage {
                type_name: ty.name().to_string(),
                needed,
                available: bytes.len(),
            };
            trace!(value = name, %err, "value synthesis failed");
            return None;
        }
        Some(Self {
            snapshot: self.snapshot.clone(),
            name: name.to_string(),
            ty: ty.clone(),
            backing: Backing::Bytes(Arc::from(&bytes[..needed])),
        })
    }
}
