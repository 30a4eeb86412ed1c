//! Reading the wire format back into an executable filter.
//!
//! The test engine consumes compiled filters through a single seam,
//! [`FilterParser`]: "parse this XML into a filter object". This crate
//! ships one implementation, [`XmlFilterParser`], which produces a
//! [`TestFilter`] that can be evaluated against any [`Selectable`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::trace;

use crate::error::{FilterError, Result};
use crate::kind::NodeKind;
use crate::target::Selectable;

/// Turns filter XML into an engine-specific filter object.
pub trait FilterParser {
    /// The engine's executable filter.
    type Filter;
    /// The engine's parse error.
    type Error;

    fn parse_filter(&self, xml: &str) -> std::result::Result<Self::Filter, Self::Error>;
}

/// How a predicate compares a field.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact, case-sensitive equality.
    Literal(String),
    /// Unanchored regular expression search.
    Regex(Regex),
}

impl Pattern {
    /// Builds a pattern, compiling `text` when `is_regex` is set.
    pub fn new(text: &str, is_regex: bool) -> Result<Self> {
        if is_regex {
            Ok(Pattern::Regex(Regex::new(text)?))
        } else {
            Ok(Pattern::Literal(text.to_string()))
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Literal(expected) => expected == value,
            Pattern::Regex(regex) => regex.is_match(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Regex(regex) => regex.as_str(),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }
}

/// The test field a name predicate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchField {
    /// `<test>`: the full name.
    FullName,
    /// `<name>`: the short name.
    Name,
    /// `<class>`
    Class,
    /// `<method>`
    Method,
    /// `<namespace>`
    Namespace,
    /// `<cat>`: any of the categories.
    Category,
}

impl MatchField {
    fn for_kind(kind: NodeKind) -> Option<MatchField> {
        match kind {
            NodeKind::Test => Some(MatchField::FullName),
            NodeKind::GivenName => Some(MatchField::Name),
            NodeKind::Class => Some(MatchField::Class),
            NodeKind::Method => Some(MatchField::Method),
            NodeKind::Namespace => Some(MatchField::Namespace),
            NodeKind::Category => Some(MatchField::Category),
            _ => None,
        }
    }

    fn matches<T: Selectable + ?Sized>(self, pattern: &Pattern, test: &T) -> bool {
        match self {
            MatchField::FullName => pattern.is_match(test.full_name()),
            MatchField::Name => pattern.is_match(test.name()),
            MatchField::Class => test.class_name().is_some_and(|v| pattern.is_match(v)),
            MatchField::Method => test.method_name().is_some_and(|v| pattern.is_match(v)),
            MatchField::Namespace => test.namespace().is_some_and(|v| pattern.is_match(v)),
            MatchField::Category => test.categories().iter().any(|c| pattern.is_match(c)),
        }
    }
}

/// A parsed, executable filter.
#[derive(Debug, Clone)]
pub enum TestFilter {
    /// Selects every test.
    Empty,
    And(Vec<TestFilter>),
    Or(Vec<TestFilter>),
    Not(Box<TestFilter>),
    /// Test id is one of the listed ids.
    Id(Vec<String>),
    Match { field: MatchField, pattern: Pattern },
    /// Some value of the named property matches.
    Property { name: String, pattern: Pattern },
}

impl TestFilter {
    /// Returns `true` if `test` is selected.
    pub fn pass<T: Selectable + ?Sized>(&self, test: &T) -> bool {
        match self {
            TestFilter::Empty => true,
            TestFilter::And(filters) => filters.iter().all(|f| f.pass(test)),
            TestFilter::Or(filters) => filters.iter().any(|f| f.pass(test)),
            TestFilter::Not(inner) => !inner.pass(test),
            TestFilter::Id(ids) => ids.iter().any(|id| id == test.test_id()),
            TestFilter::Match { field, pattern } => field.matches(pattern, test),
            TestFilter::Property { name, pattern } => test
                .property_values(name)
                .iter()
                .any(|value| pattern.is_match(value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TestFilter::Empty)
    }
}

/// The bundled parser for the filter wire format.
///
/// Accepts `<filter></filter>` and `<filter/>` alike as the empty filter;
/// several top-level elements are an implicit AND. Documents nesting deeper
/// than [`MAX_NESTING_DEPTH`] are rejected as malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFilterParser;

impl XmlFilterParser {
    pub fn new() -> Self {
        XmlFilterParser
    }
}

impl FilterParser for XmlFilterParser {
    type Filter = TestFilter;
    type Error = FilterError;

    fn parse_filter(&self, xml: &str) -> Result<TestFilter> {
        let document = read_document(xml)?;
        if document.tag != NodeKind::Root.tag() {
            return Err(FilterError::malformed(format!(
                "expected <filter> at the top, found <{}>",
                document.tag
            )));
        }
        let mut children = convert_children(document.children)?;
        Ok(match children.len() {
            0 => TestFilter::Empty,
            1 => children.remove(0),
            _ => TestFilter::And(children),
        })
    }
}

/// A generic XML element, before it is given filter meaning.
#[derive(Debug, Default)]
struct RawElement {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<RawElement>,
}

impl RawElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(RawElement {
            tag,
            attributes,
            ..RawElement::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn is_regex(&self) -> bool {
        self.attribute("re") == Some("1")
    }
}

/// Deepest element nesting the bundled parser accepts, `<filter>` included.
pub const MAX_NESTING_DEPTH: usize = 128;

fn read_document(xml: &str) -> Result<RawElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<RawElement> = Vec::new();
    let mut document = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(FilterError::malformed(format!(
                        "elements nest deeper than {MAX_NESTING_DEPTH} levels"
                    )));
                }
                stack.push(RawElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = RawElement::from_start(&start)?;
                attach(&mut stack, &mut document, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FilterError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut document, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&text),
                    None => return Err(FilterError::malformed("text outside of <filter>")),
                }
            }
            Event::CData(data) => {
                let data = String::from_utf8_lossy(&data.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&data),
                    None => return Err(FilterError::malformed("text outside of <filter>")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FilterError::malformed(format!("<{}> is never closed", open.tag)));
    }
    document.ok_or_else(|| FilterError::malformed("document is empty"))
}

fn attach(
    stack: &mut [RawElement],
    document: &mut Option<RawElement>,
    element: RawElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if document.is_none() => *document = Some(element),
        None => return Err(FilterError::malformed("more than one top-level element")),
    }
    Ok(())
}

fn convert_children(children: Vec<RawElement>) -> Result<Vec<TestFilter>> {
    children.into_iter().map(convert).collect()
}

fn convert(element: RawElement) -> Result<TestFilter> {
    trace!(tag = %element.tag, "parse filter element");
    let kind = NodeKind::from_tag(&element.tag)
        .ok_or_else(|| FilterError::UnknownElement(element.tag.clone()))?;

    match kind {
        NodeKind::Root => Err(FilterError::malformed("<filter> can only be the top element")),
        NodeKind::And => Ok(TestFilter::And(convert_children(element.children)?)),
        NodeKind::Or => Ok(TestFilter::Or(convert_children(element.children)?)),
        NodeKind::Not => {
            let mut operands = convert_children(element.children)?;
            if operands.len() != 1 {
                return Err(FilterError::malformed(format!(
                    "<not> needs exactly one operand, found {}",
                    operands.len()
                )));
            }
            Ok(TestFilter::Not(Box::new(operands.remove(0))))
        }
        NodeKind::Id => {
            let ids: Vec<String> = element
                .text
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                return Err(FilterError::malformed("<id> lists no ids"));
            }
            Ok(TestFilter::Id(ids))
        }
        NodeKind::Property => {
            let name = element
                .attribute("name")
                .filter(|name| !name.is_empty())
                .ok_or_else(|| FilterError::malformed("<prop> needs a name attribute"))?
                .to_string();
            let pattern = Pattern::new(&element.text, element.is_regex())?;
            Ok(TestFilter::Property { name, pattern })
        }
        NodeKind::Test
        | NodeKind::GivenName
        | NodeKind::Class
        | NodeKind::Method
        | NodeKind::Namespace
        | NodeKind::Category => {
            if element.text.is_empty() {
                return Err(FilterError::malformed(format!("<{kind}> has no value")));
            }
            let field = MatchField::for_kind(kind).ok_or_else(|| {
                FilterError::UnknownElement(element.tag.clone())
            })?;
            let pattern = Pattern::new(&element.text, element.is_regex())?;
            Ok(TestFilter::Match { field, pattern })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TestCase;

    fn parse(xml: &str) -> Result<TestFilter> {
        XmlFilterParser::new().parse_filter(xml)
    }

    fn sample() -> TestCase {
        TestCase::new("0-1001", "Acme.Tests.MathFixture.Adds")
            .with_class("Acme.Tests.MathFixture")
            .with_method("Adds")
            .with_namespace("Acme.Tests")
            .with_category("fast")
            .with_property("Owner", "ana")
    }

    #[test]
    fn empty_forms() {
        assert!(parse("<filter></filter>").unwrap().is_empty());
        assert!(parse("<filter/>").unwrap().is_empty());
        assert!(parse("<filter />").unwrap().pass(&sample()));
    }

    #[test]
    fn each_field() {
        let test = sample();
        assert!(parse("<filter><test>Acme.Tests.MathFixture.Adds</test></filter>")
            .unwrap()
            .pass(&test));
        assert!(parse("<filter><name>Adds</name></filter>").unwrap().pass(&test));
        assert!(parse("<filter><class>Acme.Tests.MathFixture</class></filter>")
            .unwrap()
            .pass(&test));
        assert!(parse("<filter><method>Adds</method></filter>").unwrap().pass(&test));
        assert!(parse("<filter><namespace>Acme.Tests</namespace></filter>")
            .unwrap()
            .pass(&test));
        assert!(parse("<filter><cat>fast</cat></filter>").unwrap().pass(&test));
        assert!(parse("<filter><prop name=\"Owner\">ana</prop></filter>")
            .unwrap()
            .pass(&test));
        assert!(parse("<filter><id>9,0-1001</id></filter>").unwrap().pass(&test));

        assert!(!parse("<filter><cat>slow</cat></filter>").unwrap().pass(&test));
        assert!(!parse("<filter><name>Add</name></filter>").unwrap().pass(&test));
        assert!(!parse("<filter><prop name=\"Owner\">bo</prop></filter>")
            .unwrap()
            .pass(&test));
    }

    #[test]
    fn missing_optional_fields_never_match() {
        let bare = TestCase::new("1", "A.B");
        assert!(!parse("<filter><class re=\"1\">.*</class></filter>")
            .unwrap()
            .pass(&bare));
        assert!(!parse("<filter><not><class>X</class></not></filter>")
            .unwrap()
            .pass(&TestCase::new("1", "A.B").with_class("X")));
    }

    #[test]
    fn regex_is_unanchored() {
        let test = sample();
        assert!(parse("<filter><test re=\"1\">Math</test></filter>")
            .unwrap()
            .pass(&test));
        assert!(!parse("<filter><test re=\"1\">^Math</test></filter>")
            .unwrap()
            .pass(&test));
        assert!(parse("<filter><prop re=\"1\" name=\"Owner\">^a</prop></filter>")
            .unwrap()
            .pass(&test));
    }

    #[test]
    fn boolean_structure() {
        let test = sample();
        let xml = "<filter><or><and><cat>slow</cat><name>Adds</name></and><not><id>a,b</id></not></or></filter>";
        assert!(parse(xml).unwrap().pass(&test));

        let xml = "<filter><cat>fast</cat><not><name>Adds</name></not></filter>";
        let filter = parse(xml).unwrap();
        assert!(matches!(filter, TestFilter::And(ref parts) if parts.len() == 2));
        assert!(!filter.pass(&test));
    }

    #[test]
    fn escaped_text_round_trips() {
        let test = TestCase::new("1", "A.B<int>");
        assert!(parse("<filter><test>A.B&lt;int&gt;</test></filter>")
            .unwrap()
            .pass(&test));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            parse("<filter><bogus>x</bogus></filter>"),
            Err(FilterError::UnknownElement(ref tag)) if tag == "bogus"
        ));
        assert!(matches!(
            parse("<and><cat>x</cat></and>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            parse("<filter><not><cat>a</cat><cat>b</cat></not></filter>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            parse("<filter><not></not></filter>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            parse("<filter><prop>v</prop></filter>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            parse("<filter><cat></cat></filter>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            parse("<filter><id> , </id></filter>"),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(parse(""), Err(FilterError::Malformed(_))));
        assert!(matches!(
            parse("<filter><filter/></filter>"),
            Err(FilterError::Malformed(_))
        ));
    }

    #[test]
    fn bad_regex_is_reported() {
        assert!(matches!(
            parse("<filter><test re=\"1\">(</test></filter>"),
            Err(FilterError::InvalidRegex(_))
        ));
    }

    #[test]
    fn unclosed_document_is_an_error() {
        assert!(parse("<filter><cat>a</cat>").is_err());
    }

    fn nested_nots(depth: usize) -> String {
        format!(
            "<filter>{}<cat>a</cat>{}</filter>",
            "<not>".repeat(depth),
            "</not>".repeat(depth)
        )
    }

    #[test]
    fn nesting_depth_is_limited() {
        // <filter> and <cat> take two of the levels.
        let deepest = parse(&nested_nots(MAX_NESTING_DEPTH - 2)).unwrap();
        assert!(matches!(deepest, TestFilter::Not(_)));

        let err = parse(&nested_nots(MAX_NESTING_DEPTH - 1)).unwrap_err();
        assert!(matches!(err, FilterError::Malformed(ref msg) if msg.contains("deeper")));

        let err = parse(&nested_nots(200_000)).unwrap_err();
        assert!(matches!(err, FilterError::Malformed(_)));
    }
}
