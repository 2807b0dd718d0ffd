/*!
 * XML document model.
 *
 * Parses a raw byte stream into a tagged-variant tree, exposes the
 * translatable text leaves in traversal order, and serializes the tree back
 * to bytes with the original byte-order marker and charset. The encoding is
 * sniffed from the leading bytes: UTF-16LE and UTF-16BE carry a BOM, anything
 * else is treated as UTF-8.
 */

use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;

/// Element tags whose subtrees are never visited for translation, matched
/// case-insensitively. Page-break markers carry positional text that must
/// stay untouched.
pub const SKIP_TAGS: &[&str] = &["pb"];

/// Leaves that are only digits, punctuation or underscores after trimming are
/// not translation candidates (page numbers, separators).
static NON_TRANSLATABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\W_]+$").expect("non-translatable pattern is valid"));

/// Whether a text leaf is a candidate for translation.
pub fn is_translatable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !NON_TRANSLATABLE.is_match(trimmed)
}

fn is_skipped_tag(name: &str) -> bool {
    SKIP_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}

/// Document text encoding, preserved between input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEncoding {
    /// UTF-8, no byte-order marker
    Utf8,
    /// UTF-16 little-endian with BOM FF FE
    Utf16Le,
    /// UTF-16 big-endian with BOM FE FF
    Utf16Be,
}

impl DocumentEncoding {
    /// Sniff the encoding from the leading bytes.
    pub fn sniff(raw: &[u8]) -> Self {
        if raw.starts_with(&[0xFF, 0xFE]) {
            Self::Utf16Le
        } else if raw.starts_with(&[0xFE, 0xFF]) {
            Self::Utf16Be
        } else {
            Self::Utf8
        }
    }

    /// Decode raw bytes, returning the text and the detected encoding.
    pub fn decode(raw: &[u8]) -> Result<(String, Self)> {
        let encoding = Self::sniff(raw);
        let (text, had_errors) = match encoding {
            Self::Utf16Le => UTF_16LE.decode_with_bom_removal(raw),
            Self::Utf16Be => UTF_16BE.decode_with_bom_removal(raw),
            Self::Utf8 => UTF_8.decode_with_bom_removal(raw),
        };
        if had_errors {
            return Err(anyhow!("input is not valid {}", encoding.label()));
        }
        Ok((text.into_owned(), encoding))
    }

    /// Encode text back to bytes, re-emitting the BOM for UTF-16 variants.
    /// encoding_rs encoders only emit ASCII-compatible encodings, so the
    /// UTF-16 code units are assembled directly.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => {
                let mut out = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
            Self::Utf16Be => {
                let mut out = vec![0xFE, 0xFF];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                out
            }
        }
    }

    /// Human-readable charset label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
        }
    }
}

/// A node in the parsed document tree.
#[derive(Debug, Clone)]
pub enum XmlNode {
    /// Element with tag name, attributes and children
    Element {
        /// Tag name as written
        name: String,
        /// Attributes in document order, values unescaped
        attrs: Vec<(String, String)>,
        /// Child nodes in document order
        children: Vec<XmlNode>,
    },
    /// Atomic text leaf
    Text(String),
    /// CDATA section, never translated
    CData(String),
    /// Comment, stored raw
    Comment(String),
    /// XML declaration content (`xml version=...`)
    Decl(String),
    /// Processing instruction, stored raw
    Pi(String),
    /// DOCTYPE content, stored raw
    DocType(String),
}

/// A parsed document plus its original encoding.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    encoding: DocumentEncoding,
}

impl XmlDocument {
    /// Parse a raw byte stream into a document tree.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (text, encoding) = DocumentEncoding::decode(raw)?;
        let mut reader = Reader::from_str(&text);

        let mut root: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .with_context(|| format!("XML parse error at position {}", reader.buffer_position()))?;
            match event {
                Event::Eof => break,
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut root, &mut stack, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| anyhow!("unbalanced closing tag in document"))?;
                    attach(&mut root, &mut stack, element);
                }
                Event::Text(text) => {
                    let content = text.unescape().context("invalid text content")?.into_owned();
                    attach(&mut root, &mut stack, XmlNode::Text(content));
                }
                Event::CData(data) => {
                    let content = String::from_utf8(data.into_inner().into_owned())
                        .context("invalid CDATA content")?;
                    attach(&mut root, &mut stack, XmlNode::CData(content));
                }
                Event::Comment(comment) => {
                    let content = String::from_utf8_lossy(comment.as_ref()).into_owned();
                    attach(&mut root, &mut stack, XmlNode::Comment(content));
                }
                Event::Decl(decl) => {
                    let content = String::from_utf8_lossy(decl.as_ref()).into_owned();
                    attach(&mut root, &mut stack, XmlNode::Decl(content));
                }
                Event::PI(pi) => {
                    let content = String::from_utf8_lossy(pi.as_ref()).into_owned();
                    attach(&mut root, &mut stack, XmlNode::Pi(content));
                }
                Event::DocType(doctype) => {
                    let content = String::from_utf8_lossy(doctype.as_ref()).into_owned();
                    attach(&mut root, &mut stack, XmlNode::DocType(content));
                }
            }
        }

        if !stack.is_empty() {
            return Err(anyhow!("document has {} unclosed element(s)", stack.len()));
        }

        Ok(Self { nodes: root, encoding })
    }

    /// The encoding detected at parse time.
    pub fn encoding(&self) -> DocumentEncoding {
        self.encoding
    }

    /// Collect the translatable text leaves in document traversal order.
    /// Subtrees of skip-listed tags are not visited.
    pub fn collect_text_nodes(&self) -> Vec<String> {
        let mut out = Vec::new();
        visit_texts(&self.nodes, &mut |text| out.push(text.to_string()));
        out
    }

    /// Build a copy of the document with the translatable leaves replaced by
    /// `texts`, in the same traversal order used by `collect_text_nodes`.
    /// The original tree is left untouched so repeated snapshots always see
    /// the same candidate set.
    pub fn with_text_nodes(&self, texts: &[String]) -> Result<XmlDocument> {
        let mut copy = self.clone();
        let mut next = 0usize;
        visit_texts_mut(&mut copy.nodes, &mut |slot| {
            if let Some(text) = texts.get(next) {
                *slot = text.clone();
            }
            next += 1;
        });
        if next != texts.len() {
            return Err(anyhow!(
                "text node count mismatch: document has {}, got {} replacements",
                next,
                texts.len()
            ));
        }
        Ok(copy)
    }

    /// Serialize the tree back to bytes in the original encoding.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        let text = String::from_utf8(writer.into_inner().into_inner())
            .context("serialized document is not valid UTF-8")?;
        Ok(self.encoding.encode(&text))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.context("invalid attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().context("invalid attribute value")?.into_owned();
        attrs.push((key, value));
    }
    Ok(XmlNode::Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Append a completed node to the innermost open element, or to the root list.
fn attach(root: &mut Vec<XmlNode>, stack: &mut [XmlNode], node: XmlNode) {
    match stack.last_mut() {
        Some(XmlNode::Element { children, .. }) => children.push(node),
        _ => root.push(node),
    }
}

fn visit_texts<'a>(nodes: &'a [XmlNode], f: &mut impl FnMut(&'a str)) {
    for node in nodes {
        match node {
            XmlNode::Text(text) if is_translatable(text) => f(text),
            XmlNode::Element { name, children, .. } if !is_skipped_tag(name) => {
                visit_texts(children, f);
            }
            _ => {}
        }
    }
}

fn visit_texts_mut(nodes: &mut [XmlNode], f: &mut impl FnMut(&mut String)) {
    for node in nodes {
        match node {
            XmlNode::Text(text) if is_translatable(text) => f(text),
            XmlNode::Element { name, children, .. } => {
                if !is_skipped_tag(name) {
                    visit_texts_mut(children, f);
                }
            }
            _ => {}
        }
    }
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element { name, attrs, children } => {
            let mut start = BytesStart::new(name.as_str());
            for (key, value) in attrs {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for child in children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
        XmlNode::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        XmlNode::CData(text) => {
            writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        }
        XmlNode::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
        XmlNode::Decl(content) => {
            writer.write_event(Event::Decl(BytesDecl::from_start(BytesStart::from_content(
                content.as_str(),
                3,
            ))))?;
        }
        XmlNode::Pi(content) => {
            writer.write_event(Event::PI(BytesPI::new(content.as_str())))?;
        }
        XmlNode::DocType(content) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(content.as_str())))?;
        }
    }
    Ok(())
}
