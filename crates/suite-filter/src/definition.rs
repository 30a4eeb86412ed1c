//! Declarative filter definitions.
//!
//! A [`FilterDefinition`] describes a filter as data, so it can live in a
//! JSON or YAML file next to a test suite:
//!
//! ```yaml
//! any:
//!   - all:
//!       - category: cat1
//!       - property: { name: p, value: v, regex: true }
//!   - all:
//!       - not:
//!           id: [a, b]
//! ```
//!
//! Groups listed under `any` are OR-ed, terms listed under `all` are
//! AND-ed. Building a definition drives the same chain construction as the
//! fluent API, so both produce identical XML.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiled::CompiledFilter;
use crate::compiler::compile;
use crate::error::{FilterError, Result};
use crate::kind::NodeKind;
use crate::tree::{Criterion, Cursor, Element};

/// A filter described as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// AND-groups, OR-ed together. No groups selects everything.
    #[serde(default)]
    pub any: Vec<Conjunction>,
}

/// Terms that must all hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conjunction {
    pub all: Vec<Term>,
}

/// A name, optionally marked as a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamePattern {
    Literal(String),
    Detailed {
        pattern: String,
        #[serde(default)]
        regex: bool,
    },
}

impl NamePattern {
    fn parts(&self) -> (&str, bool) {
        match self {
            NamePattern::Literal(name) => (name, false),
            NamePattern::Detailed { pattern, regex } => (pattern, *regex),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(name: &str) -> Self {
        NamePattern::Literal(name.to_string())
    }
}

/// A single condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Id(Vec<String>),
    Test(NamePattern),
    Category(NamePattern),
    Class(NamePattern),
    Method(NamePattern),
    Namespace(NamePattern),
    GivenName(NamePattern),
    Property {
        name: String,
        value: String,
        #[serde(default)]
        regex: bool,
    },
    Not(Box<Term>),
}

impl Term {
    fn criterion(&self) -> Result<Criterion> {
        let named = |kind: NodeKind, pattern: &NamePattern| {
            let (name, regex) = pattern.parts();
            Criterion::new(kind, name, regex)
        };
        match self {
            Term::Id(ids) => Criterion::ids(ids),
            Term::Test(p) => named(NodeKind::Test, p),
            Term::Category(p) => named(NodeKind::Category, p),
            Term::Class(p) => named(NodeKind::Class, p),
            Term::Method(p) => named(NodeKind::Method, p),
            Term::Namespace(p) => named(NodeKind::Namespace, p),
            Term::GivenName(p) => named(NodeKind::GivenName, p),
            Term::Property { name, value, regex } => {
                Criterion::property(name.as_str(), value.as_str(), *regex)
            }
            Term::Not(_) => Err(FilterError::invalid_argument(
                "a negation is not a predicate",
            )),
        }
    }

    fn append(&self, cursor: Cursor) -> Result<Cursor> {
        match self {
            Term::Not(inner) => inner.append(cursor.push(Element::Not)?),
            term => cursor.push(Element::Match(term.criterion()?)),
        }
    }
}

impl FilterDefinition {
    /// Compiles the definition.
    ///
    /// Fails with `InvalidArgument` if a group has no terms or a term is
    /// invalid.
    pub fn build(&self) -> Result<CompiledFilter> {
        let mut cursor = Cursor::new();
        for (index, group) in self.any.iter().enumerate() {
            if group.all.is_empty() {
                return Err(FilterError::invalid_argument(format!(
                    "group {index} has no terms"
                )));
            }
            if index > 0 {
                cursor = cursor.push(Element::Or)?;
            }
            for (position, term) in group.all.iter().enumerate() {
                if position > 0 {
                    cursor = cursor.push(Element::And)?;
                }
                cursor = term.append(cursor)?;
            }
        }
        debug!(groups = self.any.len(), "built filter definition");
        compile(cursor.arena(), cursor.position())
    }
}
