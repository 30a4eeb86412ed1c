//! Arena-backed filter chains.
//!
//! A chain is a singly linked list of [`Node`]s stored in an [`Arena`].
//! Links are [`NodeId`] indices: every node records the node that created
//! it as `parent`, and a node's `child` can be assigned exactly once.

use crate::error::{FilterError, Result};
use crate::kind::NodeKind;
use crate::xml::{close_tag, open_tag, push_attr, push_text, WriteXml};

/// Index of a node inside its [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The payload of a predicate node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    kind: NodeKind,
    name: String,
    value: Option<String>,
    is_regex: bool,
}

impl Criterion {
    /// Creates a criterion for a predicate kind other than `Property`.
    ///
    /// Fails with `InvalidArgument` for container kinds, for `Property`
    /// (use [`Criterion::property`]) and for an empty `name`.
    pub fn new(kind: NodeKind, name: impl Into<String>, is_regex: bool) -> Result<Self> {
        if kind.is_container() {
            return Err(FilterError::invalid_argument(format!(
                "unsupported element kind '{kind}' for a predicate"
            )));
        }
        if kind == NodeKind::Property {
            return Err(FilterError::invalid_argument(
                "property predicates need a value",
            ));
        }
        let name = name.into();
        if name.is_empty() {
            return Err(FilterError::invalid_argument(format!(
                "<{kind}> predicate needs a non-empty name"
            )));
        }
        Ok(Criterion {
            kind,
            name,
            value: None,
            is_regex: is_regex && kind.supports_regex(),
        })
    }

    /// Creates a property criterion. Both `name` and `value` must be non-empty.
    pub fn property(
        name: impl Into<String>,
        value: impl Into<String>,
        is_regex: bool,
    ) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() {
            return Err(FilterError::invalid_argument(
                "property predicate needs a non-empty name",
            ));
        }
        if value.is_empty() {
            return Err(FilterError::invalid_argument(format!(
                "property '{name}' needs a non-empty value"
            )));
        }
        Ok(Criterion {
            kind: NodeKind::Property,
            name,
            value: Some(value),
            is_regex,
        })
    }

    /// Creates an id criterion from a list of ids.
    ///
    /// Empty entries are dropped; the rest are joined with `,`. Fails if
    /// nothing remains.
    pub fn ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept: Vec<String> = ids
            .into_iter()
            .filter(|id| !id.as_ref().is_empty())
            .map(|id| id.as_ref().to_string())
            .collect();
        if kept.is_empty() {
            return Err(FilterError::invalid_argument(
                "id predicate needs at least one non-empty id",
            ));
        }
        Ok(Criterion {
            kind: NodeKind::Id,
            name: kept.join(","),
            value: None,
            is_regex: false,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property value; `None` for every other kind.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_regex(&self) -> bool {
        self.is_regex
    }
}

impl WriteXml for Criterion {
    fn write_xml(&self, out: &mut String, _include_tag: bool) {
        let tag = self.kind.tag();
        out.push('<');
        out.push_str(tag);
        if self.is_regex {
            push_attr(out, "re", "1");
        }
        match &self.value {
            Some(value) => {
                push_attr(out, "name", &self.name);
                out.push('>');
                push_text(out, value);
            }
            None => {
                out.push('>');
                push_text(out, &self.name);
            }
        }
        close_tag(out, tag);
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Root,
    And,
    Or,
    Not,
    Match(Criterion),
}

impl Element {
    pub fn kind(&self) -> NodeKind {
        match self {
            Element::Root => NodeKind::Root,
            Element::And => NodeKind::And,
            Element::Or => NodeKind::Or,
            Element::Not => NodeKind::Not,
            Element::Match(criterion) => criterion.kind(),
        }
    }
}

/// A node of a filter chain.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) element: Element,
    pub(crate) parent: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
}

impl Node {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn kind(&self) -> NodeKind {
        self.element.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    /// A leaf has no child and is the only valid compile entry point.
    pub fn is_leaf(&self) -> bool {
        self.child.is_none()
    }
}

/// Storage for the nodes of one chain.
///
/// A fresh arena always holds its Root at index 0.
#[derive(Debug, Clone)]
pub struct Arena {
    pub(crate) nodes: Vec<Node>,
}

impl Arena {
    /// Creates an arena containing only a Root node.
    pub fn new() -> Self {
        Arena {
            nodes: vec![Node {
                element: Element::Root,
                parent: None,
                child: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a node as the child of `parent` and returns its id.
    ///
    /// Fails with `InvalidState` if `parent` already has a child, and with
    /// `InvalidArgument` if `parent` is not in this arena or `element` is a
    /// second Root.
    pub fn attach(&mut self, parent: NodeId, element: Element) -> Result<NodeId> {
        if matches!(element, Element::Root) {
            return Err(FilterError::invalid_argument(
                "a Root node can only start a chain",
            ));
        }
        let id = NodeId(self.nodes.len());
        let slot = self.nodes.get_mut(parent.0).ok_or_else(|| {
            FilterError::invalid_argument(format!("node {} is not part of this chain", parent.0))
        })?;
        if slot.child.is_some() {
            return Err(FilterError::invalid_state(format!(
                "<{}> node already has a successor",
                slot.kind()
            )));
        }
        slot.child = Some(id);
        self.nodes.push(Node {
            element,
            parent: Some(parent),
            child: None,
        });
        Ok(id)
    }

    /// Returns a renderable view of a node.
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView { arena: self, id }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

/// A node borrowed together with its arena, so it can render its child.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn child(&self) -> Option<NodeView<'a>> {
        self.arena
            .get(self.id)
            .and_then(|node| node.child)
            .map(|id| self.arena.view(id))
    }
}

impl WriteXml for NodeView<'_> {
    fn write_xml(&self, out: &mut String, include_tag: bool) {
        let Some(node) = self.arena.get(self.id) else {
            return;
        };
        match &node.element {
            Element::Match(criterion) => criterion.write_xml(out, include_tag),
            Element::Not => {
                open_tag(out, NodeKind::Not.tag());
                if let Some(child) = self.child() {
                    child.write_xml(out, true);
                }
                close_tag(out, NodeKind::Not.tag());
            }
            Element::Root | Element::And | Element::Or => {
                let tag = node.kind().tag();
                if include_tag {
                    open_tag(out, tag);
                }
                if let Some(child) = self.child() {
                    child.write_xml(out, include_tag);
                }
                if include_tag {
                    close_tag(out, tag);
                }
            }
        }
    }
}

/// An arena plus the position the next node will be attached to.
///
/// This is the untyped chain the fluent handles and filter definitions are
/// built on.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    arena: Arena,
    at: NodeId,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        let arena = Arena::new();
        let at = arena.root();
        Cursor { arena, at }
    }

    /// Attaches `element` after the current position and moves onto it.
    pub(crate) fn push(mut self, element: Element) -> Result<Self> {
        self.at = self.arena.attach(self.at, element)?;
        Ok(self)
    }

    pub(crate) fn kind(&self) -> NodeKind {
        self.arena
            .get(self.at)
            .map(Node::kind)
            .unwrap_or(NodeKind::Root)
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    pub(crate) fn position(&self) -> NodeId {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_arena_holds_a_root() {
        let arena = Arena::new();
        let root = arena.get(arena.root()).unwrap();
        assert_eq!(root.kind(), NodeKind::Root);
        assert!(root.parent().is_none());
        assert!(root.is_leaf());
    }

    #[test]
    fn attach_links_both_ways() {
        let mut arena = Arena::new();
        let root = arena.root();
        let and = arena.attach(root, Element::And).unwrap();

        assert_eq!(arena.get(root).unwrap().child(), Some(and));
        assert_eq!(arena.get(and).unwrap().parent(), Some(root));
        assert!(arena.get(and).unwrap().is_leaf());
    }

    #[test]
    fn attach_twice_is_invalid_state() {
        let mut arena = Arena::new();
        let root = arena.root();
        arena.attach(root, Element::Or).unwrap();

        let err = arena.attach(root, Element::And).unwrap_err();
        assert!(matches!(err, FilterError::InvalidState(_)));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn attach_rejects_second_root_and_foreign_ids() {
        let mut arena = Arena::new();
        let root = arena.root();
        assert!(matches!(
            arena.attach(root, Element::Root),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            arena.attach(NodeId(7), Element::And),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn criterion_rejects_containers_and_empty_names() {
        assert!(matches!(
            Criterion::new(NodeKind::And, "x", false),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            Criterion::new(NodeKind::Category, "", false),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            Criterion::new(NodeKind::Property, "p", false),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            Criterion::property("p", "", false),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            Criterion::property("", "v", false),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn ids_drop_empty_entries() {
        let criterion = Criterion::ids(["", "a", "", "b"]).unwrap();
        assert_eq!(criterion.name(), "a,b");
        assert!(!criterion.is_regex());

        let empty: [&str; 0] = [];
        assert!(matches!(
            Criterion::ids(empty),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            Criterion::ids(["", ""]),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn id_criterion_never_carries_regex_flag() {
        let id = Criterion::new(NodeKind::Id, "0-1,0-2", true).unwrap();
        assert!(!id.is_regex());
        assert_eq!(id.to_xml(true), "<id>0-1,0-2</id>");
    }

    #[test]
    fn criterion_rendering() {
        let cat = Criterion::new(NodeKind::Category, "fast", false).unwrap();
        assert_eq!(cat.to_xml(true), "<cat>fast</cat>");

        let test = Criterion::new(NodeKind::Test, "A.B.*", true).unwrap();
        assert_eq!(test.to_xml(false), "<test re=\"1\">A.B.*</test>");

        let prop = Criterion::property("p", "v", true).unwrap();
        assert_eq!(prop.to_xml(true), "<prop re=\"1\" name=\"p\">v</prop>");

        let plain_prop = Criterion::property("Owner", "me", false).unwrap();
        assert_eq!(plain_prop.to_xml(true), "<prop name=\"Owner\">me</prop>");
    }

    #[test]
    fn not_renders_its_operand() {
        let mut arena = Arena::new();
        let not = arena.attach(arena.root(), Element::Not).unwrap();
        let criterion = Criterion::ids(["a", "b"]).unwrap();
        arena.attach(not, Element::Match(criterion)).unwrap();

        assert_eq!(arena.view(not).to_xml(false), "<not><id>a,b</id></not>");
    }

    #[test]
    fn containers_render_their_child() {
        let mut arena = Arena::new();
        let and = arena.attach(arena.root(), Element::And).unwrap();
        let cat = Criterion::new(NodeKind::Category, "c", false).unwrap();
        arena.attach(and, Element::Match(cat)).unwrap();

        assert_eq!(arena.view(and).to_xml(false), "<cat>c</cat>");
        assert_eq!(arena.view(and).to_xml(true), "<and><cat>c</cat></and>");
    }

    #[test]
    fn cursor_moves_forward() {
        let cursor = Cursor::new();
        assert_eq!(cursor.kind(), NodeKind::Root);
        let cursor = cursor.push(Element::Or).unwrap();
        assert_eq!(cursor.kind(), NodeKind::Or);
        assert_eq!(cursor.arena().len(), 2);
    }
}
