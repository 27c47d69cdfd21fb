//! ZAPI element model.
//!
//! ZAPI requests and responses are XML trees where every element carries
//! either text content or child elements. [`ZapiElement`] is the in-memory
//! form of such a tree, with builder helpers for requests and lookup helpers
//! for responses.
//!
//! # Example
//!
//! ```
//! use ontap_cfgmgr_common::zapi::ZapiElement;
//!
//! let mut request = ZapiElement::new("net-vlan-get");
//! request.add_new_child("interface-name", "e0a-13");
//! request.add_new_child("node", "node1");
//!
//! assert_eq!(
//!     request.to_xml(),
//!     "<net-vlan-get><interface-name>e0a-13</interface-name><node>node1</node></net-vlan-get>"
//! );
//! ```

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CfgMgrError, CfgMgrResult};

/// Namespace of the ZAPI envelope.
pub const ZAPI_NAMESPACE: &str = "http://www.netapp.com/filer/admin";

/// Envelope element name.
pub const NETAPP_ELEMENT: &str = "netapp";

/// Results element name.
pub const RESULTS_ELEMENT: &str = "results";

/// errno returned when the requested entry does not exist.
pub const EOBJECTNOTFOUND: &str = "15661";

/// A single ZAPI element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZapiElement {
    name: String,
    attrs: Vec<(String, String)>,
    content: String,
    children: Vec<ZapiElement>,
}

impl ZapiElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates an element holding text content.
    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content (empty for container elements).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[ZapiElement] {
        &self.children
    }

    /// Appends a text child.
    pub fn add_new_child(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.children.push(Self::with_content(name, content));
    }

    /// Appends an already built child element.
    pub fn add_child_elem(&mut self, child: ZapiElement) {
        self.children.push(child);
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Gets an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets the first child with the given name.
    pub fn child(&self, name: &str) -> Option<&ZapiElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Gets the text content of the first child with the given name.
    pub fn child_content(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.content.as_str())
    }

    /// Follows a chain of child names, returning `None` as soon as a link is missing.
    pub fn child_path(&self, path: &[&str]) -> Option<&ZapiElement> {
        path.iter().try_fold(self, |elem, name| elem.child(name))
    }

    /// Serializes the element (without XML declaration).
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() && self.content.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        out.push_str(&escape(self.content.as_str()));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Parses a document and returns its root element.
    pub fn from_xml(xml: &str) -> CfgMgrResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<ZapiElement> = Vec::new();
        let mut root: Option<ZapiElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| CfgMgrError::protocol(format!("invalid XML: {}", e)))?;

            match event {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let elem = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, elem)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| CfgMgrError::protocol(format!("invalid text: {}", e)))?;
                        top.content.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.content
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    let elem = stack
                        .pop()
                        .ok_or_else(|| CfgMgrError::protocol("unbalanced closing tag"))?;
                    Self::attach(&mut stack, &mut root, elem)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(CfgMgrError::protocol("unexpected end of document"));
        }
        root.ok_or_else(|| CfgMgrError::protocol("empty document"))
    }

    fn from_start(start: &BytesStart<'_>) -> CfgMgrResult<Self> {
        let mut elem = Self::new(String::from_utf8_lossy(start.local_name().as_ref()));
        for attr in start.attributes() {
            let attr =
                attr.map_err(|e| CfgMgrError::protocol(format!("invalid attribute: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| CfgMgrError::protocol(format!("invalid attribute: {}", e)))?;
            elem.set_attr(String::from_utf8_lossy(attr.key.as_ref()), value);
        }
        Ok(elem)
    }

    fn attach(
        stack: &mut [ZapiElement],
        root: &mut Option<ZapiElement>,
        elem: ZapiElement,
    ) -> CfgMgrResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(elem),
            None if root.is_none() => *root = Some(elem),
            None => return Err(CfgMgrError::protocol("multiple root elements")),
        }
        Ok(())
    }
}
