//! The output of compilation.

use std::fmt;

use once_cell::sync::OnceCell;

use crate::engine::{FilterParser, TestFilter, XmlFilterParser};
use crate::error::Result;
use crate::target::Selectable;

/// A compiled test filter.
///
/// Holds the wire-format XML handed to the test engine. The parsed form is
/// only materialized the first time [`CompiledFilter::filter`] is called.
///
/// # Example
///
/// ```
/// use suite_filter::FilterBuilder;
///
/// let filter = FilterBuilder::new()
///     .category("smoke")?
///     .or()?
///     .test_regex("^Api\\.")?
///     .build()?;
///
/// assert_eq!(
///     filter.xml(),
///     "<filter><or><cat>smoke</cat><test re=\"1\">^Api\\.</test></or></filter>"
/// );
/// # Ok::<(), suite_filter::FilterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    xml: String,
    parsed: OnceCell<TestFilter>,
}

impl CompiledFilter {
    pub(crate) fn new(xml: String) -> Self {
        CompiledFilter {
            xml,
            parsed: OnceCell::new(),
        }
    }

    /// The filter's XML.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    /// Returns `true` for the filter that selects everything.
    pub fn is_empty(&self) -> bool {
        self.xml == "<filter></filter>"
    }

    /// Returns the parsed filter, parsing it on first use.
    pub fn filter(&self) -> Result<&TestFilter> {
        self.parsed
            .get_or_try_init(|| XmlFilterParser::new().parse_filter(&self.xml))
    }

    /// Hands the XML to an engine's parser.
    pub fn parse_with<P: FilterParser>(&self, parser: &P) -> std::result::Result<P::Filter, P::Error> {
        parser.parse_filter(&self.xml)
    }

    /// Tests a single item against this filter.
    pub fn pass<T: Selectable + ?Sized>(&self, test: &T) -> Result<bool> {
        Ok(self.filter()?.pass(test))
    }

    /// Returns the items this filter selects, in input order.
    pub fn select<'a, T: Selectable>(&self, tests: &'a [T]) -> Result<Vec<&'a T>> {
        let filter = self.filter()?;
        Ok(tests.iter().filter(|test| filter.pass(*test)).collect())
    }
}

impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}

impl AsRef<str> for CompiledFilter {
    fn as_ref(&self) -> &str {
        &self.xml
    }
}

impl PartialEq for CompiledFilter {
    fn eq(&self, other: &Self) -> bool {
        self.xml == other.xml
    }
}

impl Eq for CompiledFilter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TestCase;

    #[test]
    fn display_is_the_xml() {
        let filter = CompiledFilter::new("<filter><cat>a</cat></filter>".to_string());
        assert_eq!(filter.to_string(), filter.xml());
        assert_eq!(filter.as_ref(), "<filter><cat>a</cat></filter>");
        assert!(!filter.is_empty());
    }

    #[test]
    fn parse_is_lazy_and_cached() {
        let filter = CompiledFilter::new("<filter><cat>a</cat></filter>".to_string());
        assert!(filter.parsed.get().is_none());

        let first = filter.filter().unwrap() as *const TestFilter;
        let second = filter.filter().unwrap() as *const TestFilter;
        assert_eq!(first, second);
    }

    #[test]
    fn select_keeps_order() {
        let filter = CompiledFilter::new("<filter><cat>a</cat></filter>".to_string());
        let tests = vec![
            TestCase::new("1", "N.C.One").with_category("a"),
            TestCase::new("2", "N.C.Two"),
            TestCase::new("3", "N.C.Three").with_category("a"),
        ];

        let ids: Vec<&str> = filter
            .select(&tests)
            .unwrap()
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn unparseable_xml_surfaces_on_use() {
        let filter = CompiledFilter::new("<filter><bogus/></filter>".to_string());
        assert!(filter.filter().is_err());
        assert!(filter.pass(&TestCase::new("1", "A.B")).is_err());
    }
}
