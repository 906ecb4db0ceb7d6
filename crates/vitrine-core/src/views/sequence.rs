//! Dynamic array view.
//!
//! Decodes the `[begin, end)` element range of a libc++ `std::vector`.
//! Before a vector finishes constructing, its header holds whatever the
//! allocator left there, so every derived fact is sanity-checked before it
//! is believed: null or inverted bounds and byte spans that do not divide
//! evenly by the element size all read as an empty container rather than
//! an error.

use tracing::{debug, trace};

use crate::config::ViewConfig;
use crate::value::{TypeInfo, Value};

const BEGIN_FIELD: &str = "__begin_";
const END_FIELD: &str = "__end_";
const CAPACITY_FIELD: &str = "__end_cap_";
const CAPACITY_FIRST_FIELD: &str = "__first_";

/// Random-access view over a contiguous element range.
#[derive(Debug)]
pub struct SequenceView<V: Value>
{
    value: V,
    config: ViewConfig,
    begin: Option<V>,
    end: Option<V>,
    elem_ty: Option<TypeInfo>,
    elem_size: u64,
}

impl<V: Value> SequenceView<V>
{
    /// Wrap a dynamic-array value. Call [`SequenceView::update`] before
    /// querying.
    pub fn new(value: V, config: ViewConfig) -> Self
    {
        Self {
            value,
            config,
            begin: None,
            end: None,
            elem_ty: None,
            elem_size: 0,
        }
    }

    /// Re-resolve the header fields and element layout for the current
    /// debuggee stop, dropping anything cached from the previous one.
    pub fn update(&mut self)
    {
        self.begin = self.value.field(BEGIN_FIELD);
        self.end = self.value.field(END_FIELD);
        self.elem_ty = self.element_type();
        self.elem_size = self.elem_ty.as_ref().map_or(0, TypeInfo::byte_size);
    }

    /// The capacity pair's `__first_` member is the one field whose declared
    /// type is reliably `T *`; the template argument list is the fallback.
    fn element_type(&self) -> Option<TypeInfo>
    {
        let from_capacity = self
            .value
            .field(CAPACITY_FIELD)
            .and_then(|cap| cap.field(CAPACITY_FIRST_FIELD))
            .and_then(|first| first.type_info())
            .and_then(|ty| ty.pointee().cloned());
        from_capacity.or_else(|| {
            let ty = self.value.type_info()?;
            ty.strip_reference().template_arg(0).map(|arg| arg.strip_reference().clone())
        })
    }

    /// Element count derived from the byte span, capped at the display cap.
    ///
    /// Recomputed on every call: the range fields live in debuggee memory
    /// and may have changed out from under us.
    pub fn child_count(&self) -> usize
    {
        let (Some(begin), Some(end)) = (&self.begin, &self.end) else {
            return 0;
        };

        let start = begin.value_as_unsigned(0);
        let finish = end.value_as_unsigned(0);
        // Null or inverted bounds mean the vector has not been constructed
        // yet; uninitialized headers would otherwise report huge counts.
        if start == 0 || finish == 0 {
            return 0;
        }
        if start >= finish {
            return 0;
        }
        if self.elem_size == 0 {
            return 0;
        }

        let span = finish - start;
        if span % self.elem_size != 0 {
            debug!(span, elem_size = self.elem_size, "byte span not a multiple of element size");
            return 0;
        }

        usize::try_from(span / self.elem_size)
            .map_or(self.config.display_cap, |count| count.min(self.config.display_cap))
    }

    /// The element at `index`, synthesized at `begin + index * elem_size`.
    pub fn child_at(&self, index: usize) -> Option<V>
    {
        if index >= self.child_count() {
            trace!(index, "sequence child out of range");
            return None;
        }
        let elem_ty = self.elem_ty.as_ref()?;
        let offset = (index as u64).checked_mul(self.elem_size)?;
        self.begin.as_ref()?.child_at_offset(&format!("[{index}]"), offset, elem_ty)
    }

    /// One-line summary, independent of the structural children.
    pub fn summary(&self) -> String
    {
        format!("size={}", self.child_count())
    }
}
