//! Small read-only element tree over `quick-xml` events.
//!
//! WordprocessingML is matched by qualified name (`w:p`, `wp:extent`), the
//! prefixes Word always writes, so namespaces are not resolved.

use super::DocxError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// First descendant named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for element in self.elements() {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants whose name is in `names`, in document order.
    pub fn find_all<'a>(&'a self, names: &[&str]) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(names, &mut found);
        found
    }

    fn collect<'a>(&'a self, names: &[&str], found: &mut Vec<&'a Element>) {
        for element in self.elements() {
            if names.contains(&element.name.as_str()) {
                found.push(element);
            }
            element.collect(names, found);
        }
    }

    /// `find(name)` followed by `attr(attribute)`.
    pub fn find_attr(&self, name: &str, attribute: &str) -> Option<&str> {
        self.find(name).and_then(|element| element.attr(attribute))
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, text: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(value) => text.push_str(value),
                Node::Element(element) => element.push_text(text),
            }
        }
    }
}

fn start_element(start: &BytesStart<'_>) -> Result<Element, DocxError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DocxError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| DocxError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Parse `xml` and return its document element.
pub fn parse(xml: &str) -> Result<Element, DocxError> {
    let mut reader = Reader::from_str(xml);
    // The bottom of the stack collects the document element.
    let mut stack = vec![Element::default()];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocxError::Xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Element(element));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(DocxError::Xml("unexpected closing tag".to_string()));
                }
                if let (Some(element), Some(parent)) = (stack.pop(), stack.last_mut()) {
                    parent.children.push(Node::Element(element));
                }
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(value.into_owned()));
                }
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(value));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(DocxError::Xml("unclosed element at end of document".to_string()));
    }

    stack
        .pop()
        .and_then(|root| {
            root.children.into_iter().find_map(|node| match node {
                Node::Element(element) => Some(element),
                Node::Text(_) => None,
            })
        })
        .ok_or_else(|| DocxError::Xml("document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Fish &amp; Chips</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">one </w:t></w:r><w:r><w:t>two</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_builds_tree() {
        let root = parse(SAMPLE).unwrap();
        assert_eq!(root.name, "w:document");

        let body = root.child("w:body").unwrap();
        let paragraphs: Vec<_> = body.elements().collect();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].find_attr("w:pStyle", "w:val"), Some("Heading1"));
    }

    #[test]
    fn test_text_unescapes_entities() {
        let root = parse(SAMPLE).unwrap();
        let runs = root.find_all(&["w:t"]);
        assert_eq!(runs[0].text(), "Fish & Chips");
        assert_eq!(runs[1].text(), "one ");
    }

    #[test]
    fn test_find_all_keeps_document_order() {
        let root = parse(SAMPLE).unwrap();
        let names: Vec<_> = root
            .find_all(&["w:p", "w:t"])
            .into_iter()
            .map(|element| element.name.as_str())
            .collect();
        assert_eq!(names, vec!["w:p", "w:t", "w:p", "w:t", "w:t"]);
    }

    #[test]
    fn test_rejects_truncated_xml() {
        assert!(parse("<w:document><w:body>").is_err());
        assert!(parse("").is_err());
    }
}
