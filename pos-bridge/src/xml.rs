//! XML encoding and generic response parsing.
//!
//! Outbound documents are built from `serde` structs with [`quick_xml::se`]. Inbound
//! documents are parsed into an [`XmlValue`] tree without any schema: an element with only
//! text becomes [`XmlValue::Text`], an element with children becomes [`XmlValue::Node`]
//! keyed by child name, and repeated children collapse into [`XmlValue::List`]. Attributes
//! are ignored and text is trimmed. Mixed content keeps its text under the `_` key.
//!
//! Lookups are explicit about absence: [`XmlValue::text_field`] returns `Ok(None)` for a
//! missing key and an error only when the key holds a structure instead of text.
//!
//! # Examples
//!
//! ```
//! use pos_bridge::xml::parse_document;
//!
//! let doc = parse_document("<response><response_code>00</response_code></response>")?;
//! let response = doc.child("response").unwrap();
//!
//! assert_eq!(response.text_field("response_code")?.as_deref(), Some("00"));
//! assert_eq!(response.text_field("auth_code")?, None);
//! # Ok::<(), pos_bridge::BridgeError>(())
//! ```

use std::collections::BTreeMap;

use quick_xml::{Reader, events::Event};
use serde::Serialize;

use crate::error::{BridgeError, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Key under which mixed content stores its own text.
pub const TEXT_KEY: &str = "_";

/// Serializes `data` as a complete XML document with the given root element.
///
/// # Errors
///
/// Returns [`BridgeError::EncodingError`] if `data` cannot be represented as XML.
pub fn to_document<T: Serialize>(root: &str, data: &T) -> Result<String> {
    let content = quick_xml::se::to_string_with_root(root, data)
        .map_err(|e| BridgeError::EncodingError(format!("failed to serialize <{root}>: {e}")))?;
    Ok(format!("{XML_DECLARATION}{content}"))
}

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Element with text content only (possibly empty).
    Text(String),
    /// Element with child elements.
    Node(BTreeMap<String, XmlValue>),
    /// Several sibling elements sharing one name.
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Returns the child element named `key`, if this is a node that has one.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Node(children) => children.get(key),
            Self::Text(_) | Self::List(_) => None,
        }
    }

    /// Follows `path` through nested nodes.
    #[must_use]
    pub fn at_path(&self, path: &[&str]) -> Option<&Self> {
        path.iter().try_fold(self, |value, key| value.child(key))
    }

    /// Returns the text if this is a text element.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) | Self::List(_) => None,
        }
    }

    /// Reads a text child.
    ///
    /// Missing and empty children are both `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ResponseParseError`] if the child exists but is not text.
    pub fn text_field(&self, key: &str) -> Result<Option<String>> {
        match self.child(key) {
            None => Ok(None),
            Some(Self::Text(text)) if text.is_empty() => Ok(None),
            Some(Self::Text(text)) => Ok(Some(text.clone())),
            Some(Self::Node(_) | Self::List(_)) => Err(BridgeError::ResponseParseError(format!(
                "<{key}> holds nested elements where text was expected"
            ))),
        }
    }

    /// Reads the first present text child among `keys`.
    ///
    /// # Errors
    ///
    /// Same as [`text_field`](Self::text_field), for any key inspected.
    pub fn first_text_field(&self, keys: &[&str]) -> Result<Option<String>> {
        for key in keys {
            if let Some(text) = self.text_field(key)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Default)]
struct ElementBuilder {
    name: String,
    text: String,
    children: Vec<(String, XmlValue)>,
}

impl ElementBuilder {
    fn new(name: String) -> Self {
        Self { name, ..Self::default() }
    }

    fn finish(self) -> (String, XmlValue) {
        if self.children.is_empty() {
            return (self.name, XmlValue::Text(self.text));
        }

        let mut children: BTreeMap<String, XmlValue> = BTreeMap::new();
        for (name, value) in self.children {
            match children.remove(&name) {
                None => {
                    children.insert(name, value);
                }
                Some(XmlValue::List(mut items)) => {
                    items.push(value);
                    children.insert(name, XmlValue::List(items));
                }
                Some(previous) => {
                    children.insert(name, XmlValue::List(vec![previous, value]));
                }
            }
        }
        if !self.text.is_empty() {
            children.insert(TEXT_KEY.to_owned(), XmlValue::Text(self.text));
        }
        (self.name, XmlValue::Node(children))
    }
}

/// Parses an XML document into a node keyed by its root element name.
///
/// Only well-formedness is checked.
///
/// # Errors
///
/// Returns [`BridgeError::DecodingError`] for malformed XML, an empty document, text
/// outside the root element, or more than one root element.
pub fn parse_document(xml: &str) -> Result<XmlValue> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let decoding_error = |reader: &Reader<&[u8]>, detail: &dyn std::fmt::Display| {
        BridgeError::DecodingError(format!("{detail} at byte {}", reader.buffer_position()))
    };

    let mut stack: Vec<ElementBuilder> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;

    loop {
        let event = reader.read_event().map_err(|e| decoding_error(&reader, &e))?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(decoding_error(&reader, &"multiple root elements"));
                }
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(ElementBuilder::new(name));
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                let element = ElementBuilder::new(name).finish();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(decoding_error(&reader, &"multiple root elements")),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| decoding_error(&reader, &e))?;
                let Some(current) = stack.last_mut() else {
                    return Err(decoding_error(&reader, &"text outside the root element"));
                };
                current.text.push_str(&text);
            }
            Event::CData(data) => {
                let Some(current) = stack.last_mut() else {
                    return Err(decoding_error(&reader, &"CDATA outside the root element"));
                };
                current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Event::End(_) => {
                let Some(builder) = stack.pop() else {
                    return Err(decoding_error(&reader, &"unexpected closing tag"));
                };
                let element = builder.finish();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(decoding_error(&reader, &"unexpected end of document"));
    }
    let (name, value) = root.ok_or_else(|| {
        BridgeError::DecodingError("document has no root element".to_owned())
    })?;

    Ok(XmlValue::Node(BTreeMap::from([(name, value)])))
}
