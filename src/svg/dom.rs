//! Mutable SVG element tree.
//!
//! `quick-xml` only offers a streaming reader, while recoloring needs to
//! look at parents, children and siblings before writing anything back. The
//! reader events are folded into a small owned tree ([`IconDocument`]) that
//! is mutated in place and serialized back to the same file.
//!
//! Text, comments, CDATA and attribute order survive a round trip. The
//! original XML declaration does not: every write starts with
//! `<?xml version='1.0' encoding='utf-8'?>`.

use quick_xml::{
    Reader,
    escape::{escape, unescape},
    events::{BytesStart, Event},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>\n";

/// Malformed XML, with the byte offset the reader stopped at.
#[derive(Debug, Error)]
#[error("malformed SVG at byte {position}: {message}")]
pub struct ParseError {
    pub position: u64,
    pub message: String,
}

impl ParseError {
    fn new(position: u64, message: impl ToString) -> Self {
        Self {
            position,
            message: message.to_string(),
        }
    }
}

/// Errors from loading or saving a document on disk.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse `{}`", .0.display())]
    Parse(PathBuf, #[source] ParseError),
}

// ============================================================================
// Nodes
// ============================================================================

/// One child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, kept in its escaped form.
    Text(String),
    Comment(String),
    CData(String),
    Instruction(String),
    DocType(String),
}

/// An element with ordered attributes and children.
///
/// Attribute values are stored unescaped; they are escaped again on write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    /// Check the local name against `tag`.
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.local_name() == tag
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Direct child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Append a child element and return a handle to it.
    pub fn push_element(&mut self, element: Element) -> &mut Element {
        self.children.push(Node::Element(element));
        match self.children.last_mut() {
            Some(Node::Element(el)) => el,
            _ => unreachable!("element was just pushed"),
        }
    }

    pub fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Remove and return every direct child element matching `take`.
    pub fn drain_elements(&mut self, mut take: impl FnMut(&Element) -> bool) -> Vec<Element> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Element(el) if take(&el) => taken.push(el),
                other => kept.push(other),
            }
        }
        self.children = kept;
        taken
    }

    /// Pre-order visit of this element and all descendant elements.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for child in self.child_elements() {
            child.walk(f);
        }
    }

    /// Mutable pre-order visit of this element and all descendant elements.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.walk_mut(f);
            }
        }
    }

    /// First descendant (excluding `self`) matching `pred`, in document order.
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, pred: &impl Fn(&Element) -> bool) -> Option<&mut Element> {
        for node in &mut self.children {
            if let Node::Element(el) = node {
                if pred(el) {
                    return Some(el);
                }
                if let Some(found) = el.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_to(out),
            Node::Text(text) => out.push_str(text),
            Node::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Node::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            Node::Instruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
            Node::DocType(text) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(text);
                out.push('>');
            }
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed SVG file: the root element plus anything around it.
#[derive(Debug, Clone, PartialEq)]
pub struct IconDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl IconDocument {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a document from a string.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(content);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| ParseError::new(position, e))?;

            match event {
                Event::Start(start) => {
                    let element = element_from(&start, position)?;
                    builder.stack.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from(&start, position)?;
                    builder.attach(Node::Element(element), position)?;
                }
                Event::End(_) => {
                    let element = builder
                        .stack
                        .pop()
                        .ok_or_else(|| ParseError::new(position, "unexpected closing tag"))?;
                    builder.attach(Node::Element(element), position)?;
                }
                Event::Text(text) => builder.attach(Node::Text(lossy(&text)), position)?,
                Event::GeneralRef(entity) => {
                    builder.attach(Node::Text(format!("&{};", lossy(&entity))), position)?
                }
                Event::CData(data) => builder.attach(Node::CData(lossy(&data)), position)?,
                Event::Comment(text) => builder.attach(Node::Comment(lossy(&text)), position)?,
                Event::PI(pi) => builder.attach(Node::Instruction(lossy(&pi)), position)?,
                Event::DocType(text) => builder.attach(Node::DocType(lossy(&text)), position)?,
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        builder.finish(reader.buffer_position() as u64)
    }

    /// Read and parse a file.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let content =
            fs::read_to_string(path).map_err(|e| DocumentError::Io(path.to_path_buf(), e))?;
        Self::parse(&content).map_err(|e| DocumentError::Parse(path.to_path_buf(), e))
    }

    /// Serialize and replace `path` through a sibling temp file.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));

        let io_err = |e| DocumentError::Io(path.to_path_buf(), e);
        fs::write(&tmp, self.to_xml()).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_err(e)
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize with an XML declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        for node in &self.prolog {
            node.write_to(&mut out);
            out.push('\n');
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            out.push('\n');
            node.write_to(&mut out);
        }
        out
    }
}

/// Folds reader events into a tree.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
    prolog: Vec<Node>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node, position: u64) -> Result<(), ParseError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_node(node);
            return Ok(());
        }

        // Whitespace between top-level nodes is not kept.
        if node.is_blank_text() {
            return Ok(());
        }

        match (node, self.root.is_some()) {
            (Node::Element(el), false) => self.root = Some(el),
            (Node::Element(_), true) => {
                return Err(ParseError::new(position, "multiple root elements"));
            }
            (Node::Text(_), _) => {
                return Err(ParseError::new(position, "text outside the root element"));
            }
            (other, false) => self.prolog.push(other),
            (other, true) => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self, position: u64) -> Result<IconDocument, ParseError> {
        if !self.stack.is_empty() {
            return Err(ParseError::new(position, "unclosed element"));
        }
        let root = self
            .root
            .ok_or_else(|| ParseError::new(position, "no root element"))?;
        Ok(IconDocument {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn element_from(start: &BytesStart<'_>, position: u64) -> Result<Element, ParseError> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::new(position, e))?;
        let key = lossy(attr.key.as_ref());
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|e| ParseError::new(position, e))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

#[inline]
fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
