//! Ordered map view: in-order positional access over a red-black tree.
//!
//! The tree is traversed exclusively through `left`/`right`/`parent` links
//! with constant extra space (no recursion, no auxiliary stack), the same
//! way a debugger-side iterator has to do it. Every walk carries a step
//! budget derived from the tree's own element counter; a tree that takes
//! more steps than it claims to hold is garbage, and once that verdict is
//! reached all further lookups in the generation short-circuit.
//!
//! Layout discovery is lazy and asymmetric: only the tree's cached leftmost
//! node is guaranteed to carry full payload type metadata, so the element
//! type and the payload's byte offset inside a node are learned during the
//! first index-0 retrieval. Until that has happened, a lookup of any higher
//! index reports unknown rather than guessing the layout.

use tracing::{debug, trace, warn};

use crate::config::ViewConfig;
use crate::value::{TypeInfo, Value};

const TREE_FIELD: &str = "__tree_";
const BEGIN_NODE_FIELD: &str = "__begin_node_";
const SIZE_PAIR_FIELD: &str = "__pair3_";
const SIZE_FIRST_FIELD: &str = "__first_";
const LEFT_FIELD: &str = "__left_";
const RIGHT_FIELD: &str = "__right_";
const PARENT_FIELD: &str = "__parent_";
const PAYLOAD_FIELD: &str = "__value_";

/// Traversal cursor over one tree node.
///
/// Wraps the node *pointer* value; a null or unreadable link becomes an
/// empty cursor whose identity is zero.
#[derive(Debug, Clone)]
struct TreeNode<V: Value>
{
    node: Option<V>,
}

impl<V: Value> TreeNode<V>
{
    fn new(node: Option<V>) -> Self
    {
        Self { node }
    }

    fn left(&self) -> Self
    {
        Self::new(self.node.as_ref().and_then(|node| node.field(LEFT_FIELD)))
    }

    fn right(&self) -> Self
    {
        Self::new(self.node.as_ref().and_then(|node| node.field(RIGHT_FIELD)))
    }

    fn parent(&self) -> Self
    {
        Self::new(self.node.as_ref().and_then(|node| node.field(PARENT_FIELD)))
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

    fn value(&self) -> Option<&V>
    {
        self.node.as_ref()
    }
}

/// The left-most descendant of `node`, or `None` once the descent exceeds
/// `budget` steps (a corrupt tree can chain `left` links forever).
fn leftmost<V: Value>(mut node: TreeNode<V>, budget: usize) -> Option<TreeNode<V>>
{
    if node.is_null() {
        return None;
    }
    let mut steps = 0usize;
    loop {
        let left = node.left();
        if left.is_null() {
            return Some(node);
        }
        node = left;
        steps += 1;
        if steps > budget {
            warn!(budget, "left descent exceeded its step budget");
            return None;
        }
    }
}

/// Whether `node` is the left child of its parent, decided by comparing
/// identities. `None` for a null node.
fn is_left_child<V: Value>(node: &TreeNode<V>) -> Option<bool>
{
    if node.is_null() {
        return None;
    }
    Some(node.identity() == node.parent().left().identity())
}

/// In-order successor of `node` using only tree links: the leftmost node of
/// the right subtree when there is one, otherwise the first ancestor that
/// holds the current chain as its left child. Both walks are step-bounded.
fn successor<V: Value>(node: &TreeNode<V>, budget: usize) -> Option<TreeNode<V>>
{
    if node.is_null() {
        return None;
    }
    let right = node.right();
    if !right.is_null() {
        return leftmost(right, budget);
    }

    let mut current = node.clone();
    let mut steps = 0usize;
    loop {
        if is_left_child(&current)? {
            return Some(current.parent());
        }
        current = current.parent();
        steps += 1;
        if steps > budget {
            warn!(budget, "parent ascent exceeded its step budget");
            return None;
        }
    }
}

/// In-order iterator state: the current node plus the walk budget.
struct TreeIterator<V: Value>
{
    node: TreeNode<V>,
    budget: usize,
}

impl<V: Value> TreeIterator<V>
{
    fn new(node: V, budget: usize) -> Self
    {
        Self {
            node: TreeNode::new(Some(node)),
            budget,
        }
    }

    fn step(&mut self) -> Option<()>
    {
        let next = successor(&self.node, self.budget)?;
        if next.is_null() {
            return None;
        }
        self.node = next;
        Some(())
    }

    /// Apply the successor step `n` times; `n == 0` and `n == 1` take the
    /// short way out.
    fn advance(mut self, n: usize) -> Option<TreeNode<V>>
    {
        match n {
            0 => {}
            1 => self.step()?,
            _ => {
                for _ in 0..n {
                    self.step()?;
                }
            }
        }
        Some(self.node)
    }
}

/// Positional view over a parent-linked balanced binary search tree.
#[derive(Debug)]
pub struct OrderedMapView<V: Value>
{
    value: V,
    config: ViewConfig,
    tree: Option<V>,
    begin_node: Option<V>,
    elem_ty: Option<TypeInfo>,
    payload_offset: Option<u64>,
    count: Option<usize>,
    garbage: bool,
}

impl<V: Value> OrderedMapView<V>
{
    /// Wrap an ordered-map value. Call [`OrderedMapView::update`] before
    /// querying.
    pub fn new(value: V, config: ViewConfig) -> Self
    {
        Self {
            value,
            config,
            tree: None,
            begin_node: None,
            elem_ty: None,
            payload_offset: None,
            count: None,
            garbage: false,
        }
    }

    /// Re-resolve the tree header for the current debuggee stop. The
    /// element type, payload offset, count cache, and garbage verdict are
    /// all generation-scoped and start over.
    pub fn update(&mut self)
    {
        self.count = None;
        self.garbage = false;
        self.elem_ty = None;
        self.payload_offset = None;
        self.tree = self.value.field(TREE_FIELD);
        self.begin_node = self.tree.as_ref().and_then(|tree| tree.field(BEGIN_NODE_FIELD));
    }

    /// Element count read from the tree's dedicated counter field (trusted,
    /// unlike the list's walk-derived size), capped at the display cap.
    pub fn child_count(&mut self) -> usize
    {
        if let Some(count) = self.count {
            return count;
        }
        let raw = self
            .tree
            .as_ref()
            .and_then(|tree| tree.field(SIZE_PAIR_FIELD))
            .and_then(|pair| pair.field(SIZE_FIRST_FIELD))
            .map_or(0, |first| first.value_as_unsigned(0));
        let count = usize::try_from(raw)
            .map_or(self.config.display_cap, |count| count.min(self.config.display_cap));
        self.count = Some(count);
        count
    }

    /// Learn the element type by dereferencing the begin node, which is the
    /// one node guaranteed to carry payload metadata.
    fn ensure_element_type(&mut self) -> bool
    {
        if self.elem_ty.is_some() {
            return true;
        }
        if self.child_count() == 0 {
            return false;
        }
        let Some(payload) = self
            .begin_node
            .as_ref()
            .and_then(Value::deref)
            .and_then(|node| node.field(PAYLOAD_FIELD))
        else {
            return false;
        };
        match payload.type_info() {
            Some(ty) => {
                self.elem_ty = Some(ty);
                true
            }
            None => false,
        }
    }

    /// The element at in-order position `index`.
    pub fn child_at(&mut self, index: usize) -> Option<V>
    {
        if index >= self.child_count() {
            return None;
        }
        if self.garbage {
            trace!(index, "tree marked garbage; refusing child lookup");
            return None;
        }

        let budget = self.child_count();
        let begin = self.begin_node.clone()?;
        let Some(node) = TreeIterator::new(begin, budget).advance(index) else {
            // Reaching this node took more steps than the tree claims to
            // hold; nothing it reports can be trusted this generation.
            warn!(index, "tree walk failed; marking tree as garbage");
            self.garbage = true;
            return None;
        };

        if !self.ensure_element_type() {
            debug!(index, "unable to infer element type from begin node");
            return None;
        }
        let elem_ty = self.elem_ty.clone()?;

        if index == 0 {
            let node_struct = node.value()?.deref()?;
            let payload = node_struct.field(PAYLOAD_FIELD)?;
            let bytes = payload.raw_bytes(usize::try_from(elem_ty.byte_size()).ok()?)?;
            // Remember where the payload sits inside a node; later indices
            // are fetched straight from that offset without a field lookup.
            self.payload_offset = node_struct
                .type_info()
                .and_then(|ty| ty.field_named(PAYLOAD_FIELD).map(|field| field.offset));
            self.value.value_from_bytes("[0]", &bytes, &elem_ty)
        } else {
            let Some(offset) = self.payload_offset else {
                debug!(index, "payload offset unknown until index 0 has been resolved");
                return None;
            };
            node.value()?.child_at_offset(&format!("[{index}]"), offset, &elem_ty)
        }
    }

    /// One-line summary, independent of the structural children.
    pub fn summary(&mut self) -> String
    {
        format!("size={}", self.child_count())
    }
}
