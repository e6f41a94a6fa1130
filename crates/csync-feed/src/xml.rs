//! Generic element tree for the catalog feed.
//!
//! The feed is read once into [`XmlNode`] values (tag, attributes, text,
//! ordered children). The document builder switches on tag names instead of
//! binding the feed to a typed object model.
//!
//! Text and CDATA under an element, up to its first child element, are
//! concatenated (entities unescaped) into `text`; this is how embedded
//! description HTML arrives. Text after a child element is dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::FeedError;

/// One element of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Text + CDATA before the first child element, unescaped.
    pub text: String,
    /// Child elements in source order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter (handy for tests).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// First attribute named `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn push_leading_text(&mut self, text: &str) {
        if self.children.is_empty() {
            self.text.push_str(text);
        }
    }
}

/// Parse a complete XML document and return its root element.
///
/// Fails on malformed markup, mismatched or unclosed tags, more than one root
/// element, stray non-whitespace text outside the root, or an empty document.
pub fn parse_document(src: &str) -> Result<XmlNode, FeedError> {
    let mut reader = Reader::from_str(src);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| FeedError::Xml {
            position,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                let node = start_node(&e, position)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = start_node(&e, position)?;
                attach(&mut stack, &mut root, node, position)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| FeedError::Xml {
                    position,
                    message: "closing tag without matching opening tag".to_string(),
                })?;
                attach(&mut stack, &mut root, node, position)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| FeedError::Xml {
                    position,
                    message: e.to_string(),
                })?;
                match stack.last_mut() {
                    Some(top) => top.push_leading_text(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(FeedError::Xml {
                            position,
                            message: "text outside the root element".to_string(),
                        })
                    }
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.push_leading_text(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::Xml {
            position: reader.buffer_position() as u64,
            message: format!("unclosed element <{}>", open.tag),
        });
    }

    root.ok_or(FeedError::EmptyDocument)
}

fn start_node(e: &BytesStart<'_>, position: u64) -> Result<XmlNode, FeedError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FeedError::Xml {
            position,
            message: format!("bad attribute on <{}>: {err}", node.tag),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| FeedError::Xml {
                position,
                message: format!("bad attribute value {key} on <{}>: {err}", node.tag),
            })?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
    position: u64,
) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(FeedError::Xml {
            position,
            message: format!("second root element <{}>", node.tag),
        }),
    }
}
