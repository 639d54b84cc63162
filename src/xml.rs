//! Owned XML element tree for walking TMX documents.
//!
//! `quick-xml` does the tokenizing; this module folds its event stream into a
//! small tree with defaulted accessors, so the loader can traverse attributes
//! and children without caring about the event API.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MapError;

/// One XML element: lowercased name, attributes, element children and the
/// concatenated text content of its direct text/CDATA nodes.
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Element name, ASCII-lowercased at parse time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute lookup. Attribute names are matched case-sensitively.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// String attribute, empty string when absent.
    pub fn str(&self, name: &str) -> &str {
        self.attr(name).unwrap_or("")
    }

    /// Integer attribute, `default` when absent or unparsable.
    pub fn int(&self, name: &str, default: i32) -> i32 {
        self.attr(name)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Unsigned 32-bit attribute (gids, sizes), `default` when absent or
    /// unparsable.
    pub fn uint(&self, name: &str, default: u32) -> u32 {
        self.attr(name)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Float attribute, `default` when absent or unparsable.
    pub fn double(&self, name: &str, default: f64) -> f64 {
        self.attr(name)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Concatenated text content of the element's direct text nodes.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All element children, in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given (lowercase) name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given (lowercase) name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, MapError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Parses an XML document into its root element.
pub(crate) fn parse(src: &str) -> Result<Element, MapError> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    // Open elements, innermost last. Closed elements attach to their parent.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MapError::InvalidMap("unbalanced closing tag".to_owned()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| MapError::InvalidMap("document has no root element".to_owned()))
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // First element to close at depth zero wins; trailing junk is ignored.
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse(r#"<Map width="3"><layer name="a"/><layer name="b"/></Map>"#).unwrap();
        assert_eq!(root.name(), "map");
        assert_eq!(root.int("width", 0), 3);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children_named("layer").count(), 2);
        assert_eq!(root.child("layer").unwrap().str("name"), "a");
    }

    #[test]
    fn attribute_names_keep_their_case() {
        let root = parse(r#"<property rawValue="7"/>"#).unwrap();
        assert_eq!(root.attr("rawValue"), Some("7"));
        assert_eq!(root.attr("rawvalue"), None);
    }

    #[test]
    fn defaulted_accessors_survive_garbage() {
        let root = parse(r#"<layer opacity="x" width="nope"/>"#).unwrap();
        assert_eq!(root.int("width", -1), -1);
        assert_eq!(root.double("opacity", 1.0), 1.0);
        assert_eq!(root.str("missing"), "");
    }

    #[test]
    fn collects_text_content() {
        let root = parse("<data>\n 1,2,\n 3,4 \n</data>").unwrap();
        assert!(root.text().contains("1,2,"));
        assert!(root.text().contains("3,4"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(parse("<a><b></a>"), Err(MapError::Xml { .. })));
        assert!(matches!(parse(""), Err(MapError::InvalidMap(_))));
    }
}
