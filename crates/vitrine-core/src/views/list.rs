//! Circular doubly linked list view.
//!
//! libc++'s `std::list` is a ring of nodes threaded through a sentinel node
//! embedded in the header: `head = sentinel.next`, `tail = sentinel.prev`,
//! and a traversal is finished when it arrives back at the sentinel's
//! address. The header also stores a size, but a clobbered list lies about
//! it, so size discovery walks the ring instead, guarded by cycle detection
//! and the display cap so a scribbled `next` chain can never hang the host.

use tracing::{debug, trace, warn};

use crate::config::ViewConfig;
use crate::types::Address;
use crate::value::{TypeInfo, Value};

const SENTINEL_FIELD: &str = "__end_";
const NEXT_FIELD: &str = "__next_";
const PREV_FIELD: &str = "__prev_";
const PAYLOAD_FIELD: &str = "__value_";

/// Traversal cursor over one list node.
///
/// Wraps the node *pointer* value; a broken or unreadable link becomes an
/// empty cursor whose identity is zero.
#[derive(Debug, Clone)]
struct ListNode<V: Value>
{
    node: Option<V>,
}

impl<V: Value> ListNode<V>
{
    fn new(node: Option<V>) -> Self
    {
        Self { node }
    }

    fn next(&self) -> Self
    {
        Self::new(self.node.as_ref().and_then(|node| node.field(NEXT_FIELD)))
    }

    fn prev(&self) -> Self
    {
        Self::new(self.node.as_ref().and_then(|node| node.field(PREV_FIELD)))
    }

    /// Address-derived identity; zero for null or unreadable nodes.
    fn identity(&self) -> u64
    {
        self.node.as_ref().map_or(0, |node| node.value_as_unsigned(0))
    }

    fn is_null(&self) -> bool
    {
        self.identity() == 0
    }

    /// Whether this cursor is back at the list's anchor node.
    fn is_sentinel(&self, anchor: Address) -> bool
    {
        self.identity() == anchor.value()
    }

    fn payload(&self) -> Option<V>
    {
        self.node.as_ref()?.field(PAYLOAD_FIELD)
    }
}

/// Positional view over a circular doubly linked list with a sentinel.
#[derive(Debug)]
pub struct LinkedListView<V: Value>
{
    value: V,
    config: ViewConfig,
    anchor: Option<Address>,
    head: Option<V>,
    tail: Option<V>,
    elem_ty: Option<TypeInfo>,
    count: Option<usize>,
    corrupt: bool,
}

impl<V: Value> LinkedListView<V>
{
    /// Wrap a list value. Call [`LinkedListView::update`] before querying.
    pub fn new(value: V, config: ViewConfig) -> Self
    {
        Self {
            value,
            config,
            anchor: None,
            head: None,
            tail: None,
            elem_ty: None,
            count: None,
            corrupt: false,
        }
    }

    /// Re-resolve the sentinel and element layout for the current debuggee
    /// stop, clearing the count cache and any corruption verdict.
    pub fn update(&mut self)
    {
        self.count = None;
        self.corrupt = false;
        let sentinel = self.value.field(SENTINEL_FIELD);
        self.anchor = sentinel.as_ref().and_then(Value::address);
        self.head = sentinel.as_ref().and_then(|s| s.field(NEXT_FIELD));
        self.tail = sentinel.and_then(|s| s.field(PREV_FIELD));
        self.elem_ty = element_type(&self.value);
    }

    /// Element count discovered by walking the ring, cached for this
    /// generation and capped at the display cap.
    pub fn child_count(&mut self) -> usize
    {
        if let Some(count) = self.count {
            return count;
        }
        let count = self.count_nodes().min(self.config.display_cap);
        self.count = Some(count);
        count
    }

    fn count_nodes(&mut self) -> usize
    {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let Some(head) = self.head.clone() else {
            return 0;
        };
        let Some(tail_addr) = self.tail.as_ref().map(|tail| tail.value_as_unsigned(0)) else {
            return 0;
        };

        let head_addr = head.value_as_unsigned(0);
        // A constructed list has both links populated; nulls mean we are
        // looking at a header that has not been initialized yet.
        if head_addr == 0 || tail_addr == 0 {
            return 0;
        }
        if head_addr == anchor.value() {
            return 0;
        }
        if head_addr == tail_addr {
            return 1;
        }

        if self.config.detect_cycles && has_cycle(&head, anchor, self.config.display_cap) {
            warn!(list = %anchor, "next chain forms a cycle; reporting list as corrupt");
            self.corrupt = true;
            return 0;
        }

        let mut size = 2usize;
        let mut current = ListNode::new(Some(head));
        while !current.next().is_sentinel(anchor) {
            size += 1;
            current = current.next();
            if current.is_null() {
                debug!(list = %anchor, "next chain hit a null link mid-walk");
                self.corrupt = true;
                return 0;
            }
            if size > self.config.display_cap {
                trace!(list = %anchor, cap = self.config.display_cap, "count walk truncated at display cap");
                return self.config.display_cap;
            }
        }
        size - 1
    }

    /// The element at `index`, copied out of the node under a fresh name.
    pub fn child_at(&mut self, index: usize) -> Option<V>
    {
        if self.corrupt {
            trace!(index, "list marked corrupt; refusing child lookup");
            return None;
        }
        if index >= self.child_count() {
            return None;
        }
        let elem_ty = self.elem_ty.clone()?;
        let head = self.head.clone()?;

        let mut node = ListNode::new(Some(head));
        match index {
            0 => {}
            1 => node = node.next(),
            _ => {
                for _ in 0..index {
                    node = node.next();
                    if node.is_null() {
                        self.corrupt = true;
                        return None;
                    }
                }
            }
        }

        // Copy the payload out under a bracketed name; handing the field
        // back directly would give every element the same name.
        let payload = node.payload()?;
        let bytes = payload.raw_bytes(usize::try_from(elem_ty.byte_size()).ok()?)?;
        self.value.value_from_bytes(&format!("[{index}]"), &bytes, &elem_ty)
    }

    /// One-line summary, independent of the structural children.
    pub fn summary(&mut self) -> String
    {
        format!("size={}", self.child_count())
    }
}

/// Floyd's cycle detection over the `next` chain: one slow cursor stepping
/// once and two fast cursors stepping twice per iteration, address-compared
/// each step. Bounded by the display cap; a cycle that long is caught by
/// the capped count walk instead.
fn has_cycle<V: Value>(head: &V, anchor: Address, budget: usize) -> bool
{
    let mut slow = ListNode::new(Some(head.clone()));
    let mut fast1 = slow.clone();
    let mut fast2 = slow.clone();
    let mut steps = 0usize;

    while !slow.next().is_sentinel(anchor) {
        let slow_id = slow.identity();
        fast1 = fast2.next();
        fast2 = fast1.next();
        if fast1.identity() == slow_id || fast2.identity() == slow_id {
            return true;
        }
        if fast1.is_null() || fast2.is_null() {
            // Ran off a broken link; whatever this is, it is not a cycle.
            return false;
        }
        slow = slow.next();
        steps += 1;
        if steps > budget {
            return false;
        }
    }
    false
}

fn element_type<V: Value>(value: &V) -> Option<TypeInfo>
{
    let ty = value.type_info()?;
    ty.strip_reference()
        .template_arg(0)
        .map(|arg| arg.strip_reference().clone())
}
