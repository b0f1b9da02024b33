//! Generic attributed XML tree
//!
//! Thin layer over `quick-xml` that checks a document for well-formedness
//! and turns it into a tree of [`Element`]s. Nothing in here knows about
//! NZB; the extractors read the tree through [`Element::child`] and
//! [`Element::children_named`].

use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Well-formedness errors
#[derive(Error, Debug)]
pub enum XmlError {
    /// Tokenizer error reported by quick-xml (bad syntax, mismatched end tag, ...)
    #[error("XML syntax error at position {position}: {source}")]
    Syntax {
        /// Byte offset of the error in the input
        position: u64,
        /// Underlying quick-xml error
        #[source]
        source: quick_xml::Error,
    },

    /// Malformed or duplicated attribute
    #[error("Malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// Bad entity or character reference
    #[error("XML escape error: {0}")]
    Escape(#[source] quick_xml::Error),

    /// Input ended while an element was still open
    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    /// No root element at all
    #[error("Document has no root element")]
    NoRoot,

    /// A second element after the root was closed
    #[error("Unexpected element after root <{0}>")]
    TrailingElement(String),

    /// Non-whitespace text outside the root element
    #[error("Text outside of the root element")]
    StrayText,
}

/// An element with its attributes, text content and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Escape(e.into()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// Local element name (namespace prefix stripped)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Unescaped, trimmed text content (empty if none)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every child element with the given name, in document order
    ///
    /// A single child and a repeated child look the same through this
    /// iterator, so callers never special-case the "one vs. many" shape.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Check that `xml` is a well-formed document with a single root element
pub fn validate(xml: &str) -> Result<(), XmlError> {
    parse(xml).map(|_| ())
}

/// Parse `xml` into its root [`Element`]
///
/// Performs the same checks as [`validate`] while building the tree.
/// Comments, processing instructions, the XML declaration and DOCTYPE
/// are skipped.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|source| XmlError::Syntax {
            position: reader.error_position() as u64,
            source,
        })?;

        match event {
            Event::Start(ref e) => {
                if let Some(root) = &root {
                    return Err(XmlError::TrailingElement(root.name.clone()));
                }
                stack.push(Element::from_start(e)?);
            }
            Event::Empty(ref e) => {
                if let Some(root) = &root {
                    return Err(XmlError::TrailingElement(root.name.clone()));
                }
                let element = Element::from_start(e)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml has already matched the end tag against its start tag
                let element = stack.pop().ok_or(XmlError::NoRoot)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|e| XmlError::Escape(e.into()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    root.ok_or(XmlError::NoRoot)
}

fn close_element(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), XmlError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }

    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None => Err(XmlError::StrayText),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd">
<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
  <!-- a comment -->
  <head>
    <meta type="title">Test &amp; File</meta>
  </head>
  <file poster="A &lt;a@example.com&gt;" date="1" subject="s">
    <groups><group>alt.test</group></groups>
  </file>
</nzb>"#;

        let root = parse(xml).unwrap();
        assert_eq!(root.name(), "nzb");
        assert_eq!(root.children().len(), 2);

        let meta = root.child("head").unwrap().child("meta").unwrap();
        assert_eq!(meta.attr("type"), Some("title"));
        assert_eq!(meta.text(), "Test & File");

        let file = root.child("file").unwrap();
        assert_eq!(file.attr("poster"), Some("A <a@example.com>"));
        assert_eq!(file.attr("missing"), None);
        assert_eq!(
            file.child("groups").unwrap().child("group").unwrap().text(),
            "alt.test"
        );
    }

    #[test]
    fn test_children_named_normalizes_shape() {
        let one = parse("<g><group>a</group></g>").unwrap();
        let many = parse("<g><group>a</group><other/><group>b</group></g>").unwrap();
        let none = parse("<g><other/></g>").unwrap();

        assert_eq!(one.children_named("group").count(), 1);
        let names: Vec<&str> = many.children_named("group").map(|g| g.text()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(none.children_named("group").count(), 0);
    }

    #[test]
    fn test_child_outlives_name() {
        let root = parse("<nzb><head/><file/></nzb>").unwrap();
        let head = {
            let name = String::from("head");
            root.child(&name)
        };
        assert_eq!(head.map(Element::name), Some("head"));
        assert!(root.child("segments").is_none());
    }

    #[test]
    fn test_namespace_prefix_stripped() {
        let root = parse(r#"<n:nzb xmlns:n="urn:x"><n:file n:poster="p"/></n:nzb>"#).unwrap();
        assert_eq!(root.name(), "nzb");
        assert_eq!(root.child("file").unwrap().attr("poster"), Some("p"));
    }

    #[test]
    fn test_cdata_and_whitespace() {
        let root = parse("<a>  <b>  padded  </b><c><![CDATA[x < y]]></c></a>").unwrap();
        assert_eq!(root.child("b").unwrap().text(), "padded");
        assert_eq!(root.child("c").unwrap().text(), "x < y");
        assert_eq!(root.text(), "");
    }

    #[test]
    fn test_unclosed_root() {
        let err = parse("<nzb><file></file>").unwrap_err();
        assert!(matches!(err, XmlError::Unclosed(ref name) if name == "nzb"));
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert!(matches!(
            parse("<nzb><file></nzb>").unwrap_err(),
            XmlError::Syntax { .. }
        ));
    }

    #[test]
    fn test_trailing_element() {
        let err = parse("<nzb></nzb><file/>").unwrap_err();
        assert!(matches!(err, XmlError::TrailingElement(_)));
    }

    #[test]
    fn test_stray_text() {
        assert!(matches!(parse("<nzb></nzb> junk").unwrap_err(), XmlError::StrayText));
        assert!(matches!(parse("junk <nzb></nzb>").unwrap_err(), XmlError::StrayText));
    }

    #[test]
    fn test_no_root() {
        assert!(matches!(parse("").unwrap_err(), XmlError::NoRoot));
        assert!(matches!(
            parse(r#"<?xml version="1.0"?><!-- only a comment -->"#).unwrap_err(),
            XmlError::NoRoot
        ));
    }

    #[test]
    fn test_duplicate_attribute() {
        assert!(parse(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(validate("<nzb/>").is_ok());
        assert!(validate("<nzb>").is_err());
    }
}
