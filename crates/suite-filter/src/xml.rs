//! Wire serialization primitives.
//!
//! Everything that ends up in a compiled filter implements [`WriteXml`].
//! [`ElementGroup`] collects elements in order and decides, from its size,
//! whether it needs a wrapping tag at all.

use quick_xml::escape::{escape, partial_escape};

/// Something that can write itself as an XML fragment.
pub trait WriteXml {
    /// Appends this element's fragment to `out`.
    ///
    /// `include_tag` asks the element to wrap its content in its own tag.
    /// Self-contained elements (predicates, negations) always carry their
    /// tag; groups and structural nodes honor the flag.
    fn write_xml(&self, out: &mut String, include_tag: bool);

    /// Returns the fragment as a new string.
    fn to_xml(&self, include_tag: bool) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, include_tag);
        out
    }
}

impl<T: WriteXml + ?Sized> WriteXml for &T {
    fn write_xml(&self, out: &mut String, include_tag: bool) {
        (**self).write_xml(out, include_tag)
    }
}

/// An ordered group of elements sharing one wrapping tag.
///
/// Rendering depends on size:
/// - empty: nothing
/// - one element: that element alone, passing `include_tag` through
/// - more: every element with its own tag, wrapped in the group tag when
///   `include_tag` is set
#[derive(Debug, Clone)]
pub struct ElementGroup<T> {
    tag: &'static str,
    items: Vec<T>,
}

impl<T> ElementGroup<T> {
    /// Creates an empty group rendered with `tag`.
    pub fn new(tag: &'static str) -> Self {
        ElementGroup {
            tag,
            items: Vec::new(),
        }
    }

    /// Appends an element.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// The group's tag.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the most recently pushed element.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }
}

impl<T: WriteXml> WriteXml for ElementGroup<T> {
    fn write_xml(&self, out: &mut String, include_tag: bool) {
        match self.items.as_slice() {
            [] => {}
            [only] => only.write_xml(out, include_tag),
            items => {
                if include_tag {
                    open_tag(out, self.tag);
                }
                for item in items {
                    item.write_xml(out, true);
                }
                if include_tag {
                    close_tag(out, self.tag);
                }
            }
        }
    }
}

pub(crate) fn open_tag(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

pub(crate) fn close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Appends character data with `<`, `>` and `&` escaped. Quotes are legal
/// in text content and stay literal.
pub(crate) fn push_text(out: &mut String, text: &str) {
    out.push_str(&partial_escape(text));
}

/// Appends ` key="value"` with the value escaped.
pub(crate) fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
