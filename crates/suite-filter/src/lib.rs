//! Suite-filter - Fluent builder and compiler for test-selection filters.
//!
//! Test engines pick the tests to run from an XML filter such as
//! `<filter><cat>smoke</cat></filter>`. This crate builds those filters:
//!
//! - A fluent API for predicates on id, full name, short name, category,
//!   class, method, namespace and properties, combined with AND, OR, NOT
//! - A compiler that normalizes the chain into an OR of AND-groups and
//!   renders the engine's XML vocabulary
//! - Declarative [`FilterDefinition`]s for filters kept in JSON or YAML
//! - A bundled parser ([`XmlFilterParser`]) that turns the XML back into an
//!   executable [`TestFilter`]
//!
//! # Quick Start
//!
//! ```rust
//! use suite_filter::{FilterBuilder, TestCase};
//!
//! let filter = FilterBuilder::new()
//!     .category("fast")?
//!     .and()?
//!     .not()?
//!     .property("Owner", "legacy")?
//!     .build()?;
//!
//! assert_eq!(
//!     filter.xml(),
//!     "<filter><cat>fast</cat><not><prop name=\"Owner\">legacy</prop></not></filter>"
//! );
//!
//! let tests = vec![
//!     TestCase::new("1", "Acme.Math.Adds").with_category("fast"),
//!     TestCase::new("2", "Acme.Math.Divides")
//!         .with_category("fast")
//!         .with_property("Owner", "legacy"),
//!     TestCase::new("3", "Acme.Io.Reads"),
//! ];
//! let selected = filter.select(&tests)?;
//! assert_eq!(selected.len(), 1);
//! assert_eq!(selected[0].id, "1");
//! # Ok::<(), suite_filter::FilterError>(())
//! ```
//!
//! # Normal Form
//!
//! A chain reads left to right. `and` continues the current group, `or`
//! starts a new one, `not` negates the single predicate after it:
//!
//! ```text
//! a AND b OR NOT c   =>   (a ∧ b) ∨ ¬c
//! ```
//!
//! One group renders without any wrapper (the outer `<filter>` is already
//! an AND); several groups render as `<or>` of `<and>` groups, with
//! single-predicate groups left bare.
//!
//! # Wire Tags
//!
//! | Node | Tag | Content |
//! |------|-----|---------|
//! | Root | `filter` | outer wrapper |
//! | And / Or / Not | `and` / `or` / `not` | nested fragments |
//! | Id | `id` | comma-joined ids |
//! | Test | `test` | full name |
//! | Category | `cat` | category |
//! | Class | `class` | class name |
//! | Method | `method` | method name |
//! | Namespace | `namespace` | namespace |
//! | Property | `prop` | `name` attribute, value content |
//! | GivenName | `name` | short name |
//!
//! Regex predicates carry `re="1"`.

mod builder;
mod compiled;
mod compiler;
mod definition;
mod engine;
mod error;
mod kind;
mod target;
mod tree;
mod xml;

// Re-export public API
pub use builder::{FilterBuilder, GroupNode, NotNode, PredicateNode};
pub use compiled::CompiledFilter;
pub use compiler::compile;
pub use definition::{Conjunction, FilterDefinition, NamePattern, Term};
pub use engine::{
    FilterParser, MatchField, Pattern, TestFilter, XmlFilterParser, MAX_NESTING_DEPTH,
};
pub use error::{FilterError, Result};
pub use kind::NodeKind;
pub use target::{Selectable, TestCase};
pub use tree::{Arena, Criterion, Element, Node, NodeId, NodeView};
pub use xml::{ElementGroup, WriteXml};
