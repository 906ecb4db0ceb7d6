//! # Error Types
//!
//! Error handling for the introspection engine.
//!
//! We use `thiserror` to generate `Error` trait implementations and
//! readable messages. Only the accessor layer reports errors this way; the
//! container views deliberately degrade to "unknown" (a `None` child, a
//! count of zero) instead of surfacing faults to the host.

use thiserror::Error;

use crate::types::Address;

/// Main error type for accessor-layer operations
///
/// Each variant corresponds to a way that resolving a typed value against a
/// memory image can fail. Consumers above the accessor boundary treat all
/// of these identically: the value is unknown.
#[derive(Error, Debug)]
pub enum VitrineError
{
    /// A read touched memory that is not present in the image
    ///
    /// This is the common case for corrupt containers: a link field holds a
    /// stale or scribbled pointer, and following it lands outside every
    /// mapped segment.
    #[error("Unmapped memory: {len} bytes at {address}")]
    UnmappedMemory
    {
        /// Start of the failed read.
        address: Address,
        /// Length of the failed read in bytes.
        len: usize,
    },

    /// The declared type has no field with the requested name
    #[error("Type `{type_name}` has no field named `{field}`")]
    UnknownField
    {
        /// Name of the type that was searched.
        type_name: String,
        /// The field name that could not be resolved.
        field: String,
    },

    /// Attempted to dereference a value whose type is not a pointer
    #[error("Cannot dereference non-pointer type `{0}`")]
    NotAPointer(String),

    /// A synthesized value's backing bytes are shorter than its type
    #[error("Byte image too short for `{type_name}`: need {needed} bytes, have {available}")]
    TruncatedImage
    {
        /// Name of the type being synthesized.
        type_name: String,
        /// Bytes the type requires.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },
}

/// Convenience alias for `Result<T, VitrineError>`
pub type VitrineResult<T> = std::result::Result<T, VitrineError>;
