//! Ordered XML element tree produced by fragment construction.
//!
//! Names are stored prefix-resolved: the builder assigns prefixes while it
//! allocates namespaces, and declares them on the fragment root, so the
//! tree itself only needs qualified names. Serialization goes through
//! quick-xml.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

/// Errors produced while serializing a tree.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
}

/// One attribute, name already qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Ordered element content: child elements, one text run, or comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(Element),
    Text(String),
    Comment(String),
}

/// A namespaced element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: String,
    prefix: String,
    local: String,
    attributes: Vec<Attribute>,
    children: Vec<Content>,
}

impl Element {
    pub fn new(
        namespace: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Element {
            namespace: namespace.into(),
            prefix: prefix.into(),
            local: local.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// `prefix:local`, or just `local` when no prefix was assigned.
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Set an attribute, replacing any existing attribute of the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
            return;
        }
        self.attributes.push(Attribute { name, value });
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Replace all children with a single text run.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Content::Text(text.into())];
    }

    /// The element's text run, if its content is text.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|c| match c {
            Content::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Content::Element(child));
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.children.push(Content::Comment(comment.into()));
    }

    pub fn children(&self) -> &[Content] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|c| match c {
            Content::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Serialize the subtree rooted at this element.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Xml(err.to_string()))
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, elem: &Element) -> Result<(), XmlError> {
    let name = elem.qualified_name();
    let mut start = BytesStart::new(name.as_str());
    for attr in &elem.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
    if elem.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|err| XmlError::Xml(err.to_string()));
    }
    writer
        .write_event(Event::Start(start))
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    for child in &elem.children {
        match child {
            Content::Element(e) => write_element(writer, e)?,
            Content::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(|err| XmlError::Xml(err.to_string()))?,
            Content::Comment(c) => writer
                .write_event(Event::Comment(BytesText::new(c)))
                .map_err(|err| XmlError::Xml(err.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(|err| XmlError::Xml(err.to_string()))
}
