//! Fluent construction of filter chains.
//!
//! Every call appends one node to the chain and hands back a handle for the
//! node it created. Handles are moved into each call, so a node's successor
//! is set exactly once and a half-built chain cannot be forked.
//!
//! | Handle | Created by | Offers |
//! |--------|------------|--------|
//! | [`FilterBuilder`] | `FilterBuilder::new()` | predicates, `and`, `or`, `not`, `build` |
//! | [`PredicateNode`] | any predicate | `and`, `or`, `build` |
//! | [`GroupNode`] | `and`, `or` | predicates, `and`, `or`, `not` |
//! | [`NotNode`] | `not` | predicates, `not` |
//!
//! # Example
//!
//! ```
//! use suite_filter::FilterBuilder;
//!
//! let filter = FilterBuilder::new()
//!     .category("cat1")?
//!     .and()?
//!     .property_regex("p", "v")?
//!     .or()?
//!     .not()?
//!     .id(["a", "b"])?
//!     .build()?;
//!
//! assert_eq!(
//!     filter.xml(),
//!     "<filter><or><and><cat>cat1</cat><prop re=\"1\" name=\"p\">v</prop></and>\
//!      <not><id>a,b</id></not></or></filter>"
//! );
//! # Ok::<(), suite_filter::FilterError>(())
//! ```

use crate::compiled::CompiledFilter;
use crate::compiler::compile;
use crate::error::Result;
use crate::kind::NodeKind;
use crate::tree::{Arena, Criterion, Cursor, Element, NodeId};

fn predicate(cursor: Cursor, criterion: Criterion) -> Result<PredicateNode> {
    Ok(PredicateNode {
        cursor: cursor.push(Element::Match(criterion))?,
    })
}

fn matching(cursor: Cursor, kind: NodeKind, name: String, is_regex: bool) -> Result<PredicateNode> {
    predicate(cursor, Criterion::new(kind, name, is_regex)?)
}

macro_rules! chain_accessors {
    () => {
        /// The chain built so far.
        pub fn chain(&self) -> &Arena {
            self.cursor.arena()
        }

        /// The id of the node this handle stands for.
        pub fn node_id(&self) -> NodeId {
            self.cursor.position()
        }
    };
}

macro_rules! predicate_methods {
    () => {
        /// Selects tests whose id is one of `ids`.
        ///
        /// Empty ids are ignored; at least one must remain.
        pub fn id<I, S>(self, ids: I) -> Result<PredicateNode>
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            predicate(self.cursor, Criterion::ids(ids)?)
        }

        /// Selects tests by full name.
        pub fn test(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Test, name.into(), false)
        }

        /// Selects tests whose full name matches `pattern`.
        pub fn test_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Test, pattern.into(), true)
        }

        /// Selects tests in a category.
        pub fn category(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Category, name.into(), false)
        }

        pub fn category_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Category, pattern.into(), true)
        }

        /// Selects tests by fixture class.
        pub fn class(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Class, name.into(), false)
        }

        pub fn class_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Class, pattern.into(), true)
        }

        /// Selects tests by method name.
        pub fn method(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Method, name.into(), false)
        }

        pub fn method_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Method, pattern.into(), true)
        }

        /// Selects tests by namespace.
        pub fn namespace(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Namespace, name.into(), false)
        }

        pub fn namespace_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::Namespace, pattern.into(), true)
        }

        /// Selects tests by their short name.
        pub fn given_name(self, name: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::GivenName, name.into(), false)
        }

        pub fn given_name_regex(self, pattern: impl Into<String>) -> Result<PredicateNode> {
            matching(self.cursor, NodeKind::GivenName, pattern.into(), true)
        }

        /// Selects tests carrying property `name` with `value`.
        pub fn property(
            self,
            name: impl Into<String>,
            value: impl Into<String>,
        ) -> Result<PredicateNode> {
            predicate(self.cursor, Criterion::property(name, value, false)?)
        }

        /// Selects tests carrying property `name` with a value matching `pattern`.
        pub fn property_regex(
            self,
            name: impl Into<String>,
            pattern: impl Into<String>,
        ) -> Result<PredicateNode> {
            predicate(self.cursor, Criterion::property(name, pattern, true)?)
        }
    };
}

macro_rules! combinator_methods {
    () => {
        /// Continues the current AND-group.
        pub fn and(self) -> Result<GroupNode> {
            Ok(GroupNode {
                cursor: self.cursor.push(Element::And)?,
            })
        }

        /// Starts a new AND-group, OR-ed with everything before it.
        pub fn or(self) -> Result<GroupNode> {
            Ok(GroupNode {
                cursor: self.cursor.push(Element::Or)?,
            })
        }
    };
}

macro_rules! not_method {
    () => {
        /// Negates the next predicate (or nested `not`).
        pub fn not(self) -> Result<NotNode> {
            Ok(NotNode {
                cursor: self.cursor.push(Element::Not)?,
            })
        }
    };
}

/// The start of a filter chain.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    cursor: Cursor,
}

impl FilterBuilder {
    /// Starts a new chain with a fresh Root node.
    pub fn new() -> Self {
        FilterBuilder {
            cursor: Cursor::new(),
        }
    }

    predicate_methods!();
    combinator_methods!();
    not_method!();
    chain_accessors!();

    /// Compiles the empty chain: a filter that selects everything.
    pub fn build(self) -> Result<CompiledFilter> {
        compile(self.cursor.arena(), self.cursor.position())
    }
}

impl Default for FilterBuilder {
    fn default() -> Self {
        FilterBuilder::new()
    }
}

/// A chain ending in a predicate.
#[derive(Debug, Clone)]
pub struct PredicateNode {
    cursor: Cursor,
}

impl PredicateNode {
    combinator_methods!();
    chain_accessors!();

    /// The predicate's kind.
    pub fn kind(&self) -> NodeKind {
        self.cursor.kind()
    }

    /// Compiles the chain.
    pub fn build(self) -> Result<CompiledFilter> {
        compile(self.cursor.arena(), self.cursor.position())
    }
}

/// A chain ending in an `and` or `or` boundary.
#[derive(Debug, Clone)]
pub struct GroupNode {
    cursor: Cursor,
}

impl GroupNode {
    predicate_methods!();
    combinator_methods!();
    not_method!();
    chain_accessors!();

    /// `And` or `Or`.
    pub fn kind(&self) -> NodeKind {
        self.cursor.kind()
    }
}

/// A chain ending in a `not` that still needs its operand.
#[derive(Debug, Clone)]
pub struct NotNode {
    cursor: Cursor,
}

impl NotNode {
    predicate_methods!();
    not_method!();
    chain_accessors!();
}
