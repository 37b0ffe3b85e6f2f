use std::{collections::HashMap, io::BufRead};

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use thiserror::Error;

/// Deepest element nesting accepted in a report. Deeper documents are rejected before the tree
/// is built.
pub const MAX_NESTING_DEPTH: usize = 512;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("{0}")]
    Syntax(String),
    #[error("document has no root element")]
    NoRootElement,
    #[error("element `{0}` found after the root element")]
    MultipleRootElements(String),
    #[error("element `{0}` is not closed")]
    UnclosedElement(String),
    #[error("end tag found without start tag")]
    EndTagWithoutStartTag,
    #[error("text found outside the root element")]
    TextOutsideRoot,
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
    #[error("element `{0}` is nested deeper than {max} levels", max = MAX_NESTING_DEPTH)]
    NestingTooDeep(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(..) => None,
        })
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + 'a
    where
        'n: 'a,
    {
        self.elements().filter(move |element| element.is(name))
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.is(name))
    }

    /// This element or its first descendant with the given name.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        if self.is(name) {
            return Some(self);
        }
        self.elements().find_map(|element| element.find_first(name))
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.find_first(name).is_some()
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(value) => text.push_str(value),
                Node::Element(element) => element.collect_text(text),
            }
        }
    }
}

/// In-memory tree of a whole XML document. Malformed input never produces a partial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    root: Element,
}

impl ParsedDocument {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.root.contains_named(name)
    }

    pub fn parse_bytes<T: AsRef<[u8]>>(xml: T) -> Result<Self, DocumentError> {
        Self::parse(xml.as_ref())
    }

    pub fn parse<R: BufRead>(xml: R) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(xml);
        // whitespace between text and CDATA runs is content; fields are trimmed when copied out
        reader.config_mut().trim_text(false);

        let mut builder = TreeBuilder::default();
        let mut buf = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                DocumentError::Syntax(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;
            match event {
                Event::Eof => break,
                Event::Start(e) => builder.open(element_from_start(&e)?)?,
                Event::Empty(e) => {
                    builder.open(element_from_start(&e)?)?;
                    builder.close()?;
                }
                Event::End(..) => builder.close()?,
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| DocumentError::Syntax(e.to_string()))?;
                    builder.text(text.into_owned())?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8(e.into_inner().into_owned())
                        .map_err(|_| DocumentError::InvalidUtf8("CDATA section"))?;
                    builder.text(text)?;
                }
                // declarations, comments, processing instructions and doctypes carry no report data
                _ => (),
            }
            buf.clear();
        }

        builder.finish().map(|root| Self { root })
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element, DocumentError> {
    let mut element = Element::new(utf8(e.name().as_ref(), "element name")?);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DocumentError::Syntax(e.to_string()))?;
        let key = utf8(attr.key.as_ref(), "attribute name")?;
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Syntax(e.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }
    Ok(element)
}

fn utf8(bytes: &[u8], what: &'static str) -> Result<String, DocumentError> {
    std::str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| DocumentError::InvalidUtf8(what))
}

#[derive(Debug, Default)]
struct TreeBuilder {
    open_elements: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) -> Result<(), DocumentError> {
        if self.open_elements.is_empty() && self.root.is_some() {
            return Err(DocumentError::MultipleRootElements(element.name));
        }
        if self.open_elements.len() >= MAX_NESTING_DEPTH {
            return Err(DocumentError::NestingTooDeep(element.name));
        }
        self.open_elements.push(element);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DocumentError> {
        let element = self
            .open_elements
            .pop()
            .ok_or(DocumentError::EndTagWithoutStartTag)?;
        match self.open_elements.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, text: String) -> Result<(), DocumentError> {
        match self.open_elements.last_mut() {
            Some(parent) => {
                if !text.is_empty() {
                    parent.children.push(Node::Text(text));
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(DocumentError::TextOutsideRoot),
        }
    }

    fn finish(self) -> Result<Element, DocumentError> {
        if let Some(unclosed) = self.open_elements.last() {
            return Err(DocumentError::UnclosedElement(unclosed.name.clone()));
        }
        self.root.ok_or(DocumentError::NoRootElement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<ParsedDocument, DocumentError> {
        ParsedDocument::parse_bytes(xml)
    }

    #[test]
    fn builds_tree_in_document_order() {
        let document = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- generated -->
            <a x="1"><b>first</b><c/><b y="&amp;2">second</b></a>"#,
        )
        .unwrap();

        let root = document.root();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));
        let names: Vec<&str> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "b"]);
        let bs: Vec<&Element> = root.children_named("b").collect();
        assert_eq!(bs.len(), 2);
        assert_eq!(bs[1].attr("y"), Some("&2"));
        assert_eq!(root.text(), "firstsecond");
    }

    #[test]
    fn keeps_cdata_and_unescapes_text() {
        let document = parse("<failure>a &lt; b<![CDATA[<not markup>]]></failure>").unwrap();
        assert_eq!(document.root().text(), "a < b<not markup>");
    }

    #[test]
    fn keeps_whitespace_between_text_and_cdata() {
        let document = parse("<failure>\n  at A.a\n  <![CDATA[at B.b]]>\n</failure>").unwrap();
        assert_eq!(document.root().text(), "\n  at A.a\n  at B.b\n");
    }

    #[test]
    fn finds_children_by_owned_name() {
        let document = parse("<r><x/><s n=\"1\"/><s n=\"2\"/></r>").unwrap();
        let name = String::from("s");
        assert_eq!(
            document.root().child(&name).and_then(|e| e.attr("n")),
            Some("1")
        );
        assert_eq!(document.root().children_named(&name).count(), 2);
        assert!(document.root().child("missing").is_none());
    }

    #[test]
    fn finds_first_at_any_depth() {
        let document =
            parse("<r><x><s n=\"1\"><s n=\"2\"/></s></x><s n=\"3\"/></r>").unwrap();
        assert_eq!(
            document.root().find_first("s").and_then(|e| e.attr("n")),
            Some("1")
        );
        assert!(document.root().find_first("r").is_some());
        assert!(!document.contains_named("missing"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a><b>").is_err());
        assert!(parse("<a attr=\"1\" attr=\"2\"/>").is_err());
        assert!(parse("<a").is_err());
        assert_eq!(parse(""), Err(DocumentError::NoRootElement));
        assert_eq!(parse("   \n "), Err(DocumentError::NoRootElement));
        assert_eq!(
            parse("<a/><b/>"),
            Err(DocumentError::MultipleRootElements(String::from("b")))
        );
        assert_eq!(parse("<a/>trailing"), Err(DocumentError::TextOutsideRoot));
    }

    #[test]
    fn limits_nesting_depth() {
        let nested = |depth: usize| {
            format!("<r>{}{}</r>", "<a>".repeat(depth), "</a>".repeat(depth))
        };
        assert!(parse(&nested(MAX_NESTING_DEPTH - 1)).is_ok());
        assert_eq!(
            parse(&nested(MAX_NESTING_DEPTH)),
            Err(DocumentError::NestingTooDeep(String::from("a")))
        );
        assert!(matches!(
            parse(&nested(50_000)),
            Err(DocumentError::NestingTooDeep(..))
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(ParsedDocument::parse_bytes(b"<a>\xff\xfe</a>".as_slice()).is_err());
    }
}
