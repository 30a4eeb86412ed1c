//! Node kinds and their wire tags.
//!
//! The [`NodeKind`] enum names every element a filter chain can contain.
//! Each kind maps to exactly one tag of the XML vocabulary understood by
//! the test engine's filter parser.

/// The kind of a node in a filter chain.
///
/// Kinds fall into two families:
/// - **Containers**: `Root`, `And`, `Or`, `Not` - structure only
/// - **Predicates**: everything else - a concrete selection criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Containers
    /// Start of every chain. Renders as the outer `<filter>` wrapper.
    Root,
    /// Conjunction boundary.
    And,
    /// Disjunction boundary.
    Or,
    /// Negation of the following node.
    Not,

    // Predicates
    /// One or more literal test ids.
    Id,
    /// Full test name.
    Test,
    /// Test category.
    Category,
    /// Fixture class name.
    Class,
    /// Test method name.
    Method,
    /// Namespace of the fixture.
    Namespace,
    /// Named property with a value.
    Property,
    /// The test's given (short) name.
    GivenName,
}

impl NodeKind {
    /// All kinds, containers first.
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Root,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Id,
        NodeKind::Test,
        NodeKind::Category,
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Namespace,
        NodeKind::Property,
        NodeKind::GivenName,
    ];

    /// Returns the wire tag for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            NodeKind::Root => "filter",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Id => "id",
            NodeKind::Test => "test",
            NodeKind::Category => "cat",
            NodeKind::Class => "class",
            NodeKind::Method => "method",
            NodeKind::Namespace => "namespace",
            NodeKind::Property => "prop",
            NodeKind::GivenName => "name",
        }
    }

    /// Looks up the kind for a wire tag.
    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Returns `true` for `Root`, `And`, `Or` and `Not`.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::And | NodeKind::Or | NodeKind::Not
        )
    }

    /// Returns `true` for kinds that carry a selection criterion.
    pub fn is_predicate(self) -> bool {
        !self.is_container()
    }

    /// Returns `true` if predicates of this kind may be marked as regex.
    pub fn supports_regex(self) -> bool {
        self.is_predicate() && self != NodeKind::Id
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
