//! What filters are evaluated against.
//!
//! The test engine decides which tests to run by asking a parsed filter
//! about each test it discovered. [`Selectable`] is the view of a test the
//! filter needs; [`TestCase`] is a plain owned implementation of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Trait for tests that can be matched by a filter.
///
/// Only `test_id`, `full_name` and `name` are required; the rest default to
/// "absent", which never matches.
///
/// # Example
///
/// ```
/// use suite_filter::Selectable;
///
/// struct Discovered {
///     id: String,
///     full_name: String,
///     tags: Vec<String>,
/// }
///
/// impl Selectable for Discovered {
///     fn test_id(&self) -> &str {
///         &self.id
///     }
///     fn full_name(&self) -> &str {
///         &self.full_name
///     }
///     fn name(&self) -> &str {
///         self.full_name.rsplit('.').next().unwrap_or(&self.full_name)
///     }
///     fn categories(&self) -> &[String] {
///         &self.tags
///     }
/// }
/// ```
pub trait Selectable {
    /// The engine-assigned id of the test.
    fn test_id(&self) -> &str;

    /// Fully qualified test name, matched by `<test>`.
    fn full_name(&self) -> &str;

    /// Short name, matched by `<name>`.
    fn name(&self) -> &str;

    /// Fully qualified fixture class, matched by `<class>`.
    fn class_name(&self) -> Option<&str> {
        None
    }

    /// Matched by `<method>`.
    fn method_name(&self) -> Option<&str> {
        None
    }

    /// Matched by `<namespace>`.
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Matched by `<cat>`.
    fn categories(&self) -> &[String] {
        &[]
    }

    /// All values recorded for a property, matched by `<prop>`.
    fn property_values(&self, _name: &str) -> &[String] {
        &[]
    }
}

/// An owned description of a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    pub id: String,
    pub full_name: String,
    pub name: String,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub namespace: Option<String>,
    pub categories: Vec<String>,
    pub properties: BTreeMap<String, Vec<String>>,
}

fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

impl TestCase {
    /// Creates a test case.
    ///
    /// The short name is the last dot-separated segment of `full_name`.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = short_name(&full_name).to_string();
        TestCase {
            id: id.into(),
            full_name,
            name,
            ..TestCase::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Records one more value for a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

impl Selectable for TestCase {
    fn test_id(&self) -> &str {
        &self.id
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Listings often leave `name` out; it then falls back to the last
    /// segment of the full name, as [`TestCase::new`] does.
    fn name(&self) -> &str {
        if self.name.is_empty() {
            short_name(&self.full_name)
        } else {
            &self.name
        }
    }

    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn property_values(&self, name: &str) -> &[String] {
        self.properties.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
