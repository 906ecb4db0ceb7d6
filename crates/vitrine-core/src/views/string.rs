//! Small-string-optimized string decoding.
//!
//! libc++ stores a string as a union of two physical layouts sharing one
//! header: a "short" form that keeps up to 127 characters inline, and a
//! "long" form holding a heap pointer and an explicit length. The low bit
//! of the first header byte picks the layout; the remaining seven bits of
//! that byte are the short form's character count.

use tracing::trace;

use crate::value::Value;

const SHORT_FIELD: &str = "__s";
const LONG_FIELD: &str = "__l";
const SIZE_FIELD: &str = "__size_";
const DATA_FIELD: &str = "__data_";

/// Marker emitted when the string's bytes cannot be read.
pub const DECODE_ERROR: &str = "<decode error: unreadable string data>";

/// Summary-only view over a small-string-optimized string value.
///
/// Strings expose no structural children; the decoded, quoted text is the
/// whole story.
#[derive(Debug)]
pub struct StringView<V: Value>
{
    value: V,
}

impl<V: Value> StringView<V>
{
    /// Wrap a string value.
    pub fn new(value: V) -> Self
    {
        Self { value }
    }

    /// Nothing to re-resolve: decoding reads the header fresh every time.
    pub fn update(&mut self) {}

    /// Strings report no children.
    #[must_use]
    pub fn child_count(&self) -> usize
    {
        0
    }

    /// Strings report no children.
    pub fn child_at(&self, _index: usize) -> Option<V>
    {
        None
    }

    /// The decoded, quoted string, or an explicit decode-error marker.
    pub fn summary(&self) -> String
    {
        decode(&self.value).unwrap_or_else(|| DECODE_ERROR.to_string())
    }
}

fn is_short(discriminant: u64) -> bool
{
    discriminant & 1 == 0
}

fn short_size(discriminant: u64) -> usize
{
    ((discriminant >> 1) & 0x7f) as usize
}

fn decode<V: Value>(value: &V) -> Option<String>
{
    let short = value.field(SHORT_FIELD)?;
    let discriminant = short.field(SIZE_FIELD)?.value_as_unsigned(0);

    if is_short(discriminant) {
        let size = short_size(discriminant);
        let bytes = short.field(DATA_FIELD)?.raw_bytes(size)?;
        return Some(quote(&bytes, size));
    }

    let long = value.field(LONG_FIELD)?;
    let size = usize::try_from(long.field(SIZE_FIELD)?.value_as_unsigned(0)).ok()?;
    if size == 0 {
        // Nothing to fetch; reading the off-by-one terminator of an empty
        // string would fault on a fresh allocation.
        return Some("\"\"".to_string());
    }

    let data = long.field(DATA_FIELD)?;
    // One extra byte for the trailing terminator.
    let bytes = data.deref()?.raw_bytes(size + 1)?;
    trace!(size, "decoded long string payload");
    Some(quote(&bytes, size))
}

/// Quote up to `limit` bytes, stopping early at the first null.
fn quote(bytes: &[u8], limit: usize) -> String
{
    let mut out = String::with_capacity(limit + 2);
    out.push('"');
    for &byte in bytes.iter().take(limit) {
        if byte == 0 {
            break;
        }
        out.push(char::from(byte));
    }
    out.push('"');
    out
}
