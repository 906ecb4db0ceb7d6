//! # View registration and dispatch
//!
//! Maps declared container type names to view implementations. Dispatch
//! happens once, at attach time: matching a value's type name against the
//! registered patterns yields a [`ContainerView`], a tagged union of the
//! concrete views, and every later query goes straight to the selected
//! implementation.

use once_cell::sync::Lazy;
use tracing::trace;

use crate::config::ViewConfig;
use crate::value::Value;
use crate::views::{LinkedListView, OrderedMapView, SequenceView, StringView};

/// The container layouts the engine can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind
{
    /// Small-string-optimized string (summary only).
    String,
    /// Contiguous dynamic array.
    Sequence,
    /// Circular doubly linked list with a sentinel.
    List,
    /// Parent-linked balanced binary search tree.
    OrderedMap,
}

/// Matches declared type names against a template base name.
///
/// `TypePattern::template_base("std::__1::vector")` matches both the bare
/// name and any instantiation `std::__1::vector<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePattern
{
    base: String,
}

impl TypePattern
{
    /// Pattern matching `base` and `base<...>`.
    pub fn template_base(base: impl Into<String>) -> Self
    {
        Self { base: base.into() }
    }

    /// Whether `type_name` names this template (or the bare base).
    #[must_use]
    pub fn matches(&self, type_name: &str) -> bool
    {
        let name = type_name.trim();
        if name == self.base {
            return true;
        }
        name.strip_prefix(self.base.as_str())
            .is_some_and(|rest| rest.starts_with('<') && rest.ends_with('>'))
    }
}

/// Registration table: ordered pattern-to-kind entries.
#[derive(Debug, Clone, Default)]
pub struct Registry
{
    entries: Vec<(TypePattern, ContainerKind)>,
}

impl Registry
{
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// A registry preloaded with the libc++ stable-ABI type names.
    #[must_use]
    pub fn with_defaults() -> Self
    {
        let mut registry = Self::new();
        registry.register(TypePattern::template_base("std::__1::string"), ContainerKind::String);
        registry.register(TypePattern::template_base("std::__1::basic_string"), ContainerKind::String);
        registry.register(TypePattern::template_base("std::__1::vector"), ContainerKind::Sequence);
        registry.register(TypePattern::template_base("std::__1::list"), ContainerKind::List);
        registry.register(TypePattern::template_base("std::__1::map"), ContainerKind::OrderedMap);
        registry
    }

    /// Register a pattern. Earlier entries win on overlap.
    pub fn register(&mut self, pattern: TypePattern, kind: ContainerKind)
    {
        self.entries.push((pattern, kind));
    }

    /// The container kind registered for `type_name`, if any.
    pub fn kind_for(&self, type_name: &str) -> Option<ContainerKind>
    {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(type_name))
            .map(|(_, kind)| *kind)
    }

    /// Select and construct a view for `value` based on its declared type
    /// name, running the initial [`ContainerView::update`]. Returns `None`
    /// for types with no registered handler.
    pub fn attach<V: Value>(&self, value: V, config: ViewConfig) -> Option<ContainerView<V>>
    {
        let ty = value.type_info()?;
        let name = ty.strip_reference().name().to_string();
        let kind = self.kind_for(&name)?;
        trace!(ty = %name, ?kind, "attaching container view");

        let mut view = match kind {
            ContainerKind::String => ContainerView::String(StringView::new(value)),
            ContainerKind::Sequence => ContainerView::Sequence(SequenceView::new(value, config)),
            ContainerKind::List => ContainerView::List(LinkedListView::new(value, config)),
            ContainerKind::OrderedMap => ContainerView::OrderedMap(OrderedMapView::new(value, config)),
        };
        view.update();
        Some(view)
    }
}

/// The shared registry preloaded with the libc++ table.
pub fn default_registry() -> &'static Registry
{
    static DEFAULT: Lazy<Registry> = Lazy::new(Registry::with_defaults);
    &DEFAULT
}

/// A container view selected at attach time.
#[derive(Debug)]
pub enum ContainerView<V: Value>
{
    /// Summary-only string view.
    String(StringView<V>),
    /// Dynamic array view.
    Sequence(SequenceView<V>),
    /// Linked list view.
    List(LinkedListView<V>),
    /// Ordered map view.
    OrderedMap(OrderedMapView<V>),
}

impl<V: Value> ContainerView<V>
{
    /// Which layout this view decodes.
    #[must_use]
    pub fn kind(&self) -> ContainerKind
    {
        match self {
            ContainerView::String(_) => ContainerKind::String,
            ContainerView::Sequence(_) => ContainerKind::Sequence,
            ContainerView::List(_) => ContainerKind::List,
            ContainerView::OrderedMap(_) => ContainerKind::OrderedMap,
        }
    }

    /// Invalidate generation-scoped caches and re-resolve header fields.
    /// Idempotent while the debuggee has not run.
    pub fn update(&mut self)
    {
        match self {
            ContainerView::String(view) => view.update(),
            ContainerView::Sequence(view) => view.update(),
            ContainerView::List(view) => view.update(),
            ContainerView::OrderedMap(view) => view.update(),
        }
    }

    /// Reported element count; an upper bound the indexing contract honors.
    pub fn child_count(&mut self) -> usize
    {
        match self {
            ContainerView::String(view) => view.child_count(),
            ContainerView::Sequence(view) => view.child_count(),
            ContainerView::List(view) => view.child_count(),
            ContainerView::OrderedMap(view) => view.child_count(),
        }
    }

    /// The element at `index`, or `None` outside `[0, child_count)`.
    pub fn child_at(&mut self, index: usize) -> Option<V>
    {
        match self {
            ContainerView::String(view) => view.child_at(index),
            ContainerView::Sequence(view) => view.child_at(index),
            ContainerView::List(view) => view.child_at(index),
            ContainerView::OrderedMap(view) => view.child_at(index),
        }
    }

    /// One-line human-readable summary (`size=3`, `"text"`).
    pub fn summary(&mut self) -> String
    {
        match self {
            ContainerView::String(view) => view.summary(),
            ContainerView::Sequence(view) => view.summary(),
            ContainerView::List(view) => view.summary(),
            ContainerView::OrderedMap(view) => view.summary(),
        }
    }
}

/// Parse a bracketed child name (`"[7]"`) back to its index. Anything that
/// is not a bracketed non-negative integer reports not-found.
pub fn child_index_from_name(name: &str) -> Option<usize>
{
    name.strip_prefix('[')?.strip_suffix(']')?.parse().ok()
}
