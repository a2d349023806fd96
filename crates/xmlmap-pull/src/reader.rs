//! `quick-xml` backed implementation of [`TokenSource`].

use std::io::BufRead;

use log::trace;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use crate::event::{Attribute, EventType, NamespaceDecl, TokenSource};
use crate::{Error, Result};

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Trim leading and trailing whitespace of text, dropping whitespace-only chunks.
    pub trim_text: bool,
    /// Reject end tags whose name does not match the open start tag.
    pub check_end_names: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            trim_text: true,
            check_end_names: true,
        }
    }
}

impl ReaderConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether text is trimmed.
    pub fn trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    /// Set whether end tag names are checked.
    pub fn check_end_names(mut self, check: bool) -> Self {
        self.check_end_names = check;
        self
    }
}

#[derive(Debug, Clone)]
struct OwnedAttribute {
    name: String,
    namespace: String,
    value: String,
}

#[derive(Debug, Clone)]
struct Declaration {
    prefix: Option<String>,
    uri: String,
}

/// Namespace-aware pull parser.
///
/// Wraps a `quick_xml::Reader`, expands empty elements into a start/end pair,
/// skips declarations, comments, processing instructions and doctypes, and
/// keeps a stack of namespace declarations so element and attribute names
/// are reported with their namespace URI.
///
/// # Example
///
/// ```
/// use xmlmap_pull::{EventType, PullParser, TokenSource};
///
/// let mut parser = PullParser::from_xml(r#"<feed xmlns="urn:feed"><title>Hi</title></feed>"#);
/// assert_eq!(parser.next()?, EventType::StartTag);
/// assert_eq!(parser.name(), "feed");
/// assert_eq!(parser.namespace(), "urn:feed");
/// # Ok::<(), xmlmap_pull::Error>(())
/// ```
pub struct PullParser<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    event: EventType,
    depth: usize,
    name: String,
    namespace: String,
    text: String,
    attributes: Vec<OwnedAttribute>,
    declarations: Vec<Declaration>,
    /// `scope_ends[d]` is the number of declarations in scope at depth `d`.
    scope_ends: Vec<usize>,
    /// An end tag was reported; its scope is popped on the next advance.
    close_pending: bool,
    /// An empty element was reported as a start tag; its end tag comes next.
    empty_pending: bool,
}

impl<'a> PullParser<&'a [u8]> {
    /// Create a parser over an in-memory document.
    pub fn from_xml(xml: &'a str) -> Self {
        Self::from_xml_with_config(xml, ReaderConfig::default())
    }

    /// Create a parser over an in-memory document with explicit settings.
    pub fn from_xml_with_config(xml: &'a str, config: ReaderConfig) -> Self {
        Self::with_reader(Reader::from_str(xml), config)
    }
}

impl<R: BufRead> PullParser<R> {
    /// Create a parser over a buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with_config(reader, ReaderConfig::default())
    }

    /// Create a parser over a buffered reader with explicit settings.
    pub fn from_reader_with_config(reader: R, config: ReaderConfig) -> Self {
        Self::with_reader(Reader::from_reader(reader), config)
    }

    fn with_reader(mut reader: Reader<R>, config: ReaderConfig) -> Self {
        let reader_config = reader.config_mut();
        reader_config.trim_text(config.trim_text);
        reader_config.expand_empty_elements = true;
        reader_config.check_end_names = config.check_end_names;

        Self {
            reader,
            buf: Vec::new(),
            event: EventType::StartDocument,
            depth: 0,
            name: String::new(),
            namespace: String::new(),
            text: String::new(),
            attributes: Vec::new(),
            declarations: Vec::new(),
            scope_ends: vec![0],
            close_pending: false,
            empty_pending: false,
        }
    }

    /// Byte offset of the reader in the input.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn xml_error(&self, err: quick_xml::Error) -> Error {
        Error::Xml {
            position: self.position(),
            message: err.to_string(),
        }
    }

    fn open_element(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let qname = std::str::from_utf8(start.name().as_ref())?.to_owned();

        let mut declared = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e.into()))?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr
                .unescape_value()
                .map_err(|e| self.xml_error(e.into()))?
                .into_owned();

            if key == "xmlns" {
                declared.push(Declaration { prefix: None, uri: value });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push(Declaration {
                    prefix: Some(prefix.to_owned()),
                    uri: value,
                });
            } else {
                raw_attributes.push((key.to_owned(), value));
            }
        }

        self.depth += 1;
        for decl in &declared {
            trace!(
                "depth {}: xmlns{}{} = {:?}",
                self.depth,
                if decl.prefix.is_some() { ":" } else { "" },
                decl.prefix.as_deref().unwrap_or(""),
                decl.uri
            );
        }
        self.declarations.extend(declared);
        self.scope_ends.push(self.declarations.len());

        let (name, namespace) = self.resolve_element(&qname)?;
        self.name = name;
        self.namespace = namespace;

        self.attributes.clear();
        for (key, value) in raw_attributes {
            let (name, namespace) = self.resolve_attribute(&key)?;
            self.attributes.push(OwnedAttribute {
                name,
                namespace,
                value,
            });
        }

        self.event = EventType::StartTag;
        Ok(())
    }

    fn close_element(&mut self, end: &BytesEnd<'_>) -> Result<()> {
        let qname = std::str::from_utf8(end.name().as_ref())?.to_owned();
        let (name, namespace) = self.resolve_element(&qname)?;
        self.name = name;
        self.namespace = namespace;
        self.attributes.clear();
        self.close_pending = true;
        self.event = EventType::EndTag;
        Ok(())
    }

    fn close_scope(&mut self) {
        self.close_pending = false;
        self.scope_ends.pop();
        self.depth = self.depth.saturating_sub(1);
        let keep = self.scope_ends.last().copied().unwrap_or(0);
        self.declarations.truncate(keep);
    }

    fn accept_text(&mut self, text: String) -> Result<bool> {
        if self.depth == 0 {
            if text.trim().is_empty() {
                return Ok(false);
            }
            return Err(Error::TextOutsideRoot {
                position: self.position(),
            });
        }
        if text.is_empty() {
            return Ok(false);
        }
        self.text = text;
        self.event = EventType::Text;
        Ok(true)
    }

    fn resolve_element(&self, qname: &str) -> Result<(String, String)> {
        match qname.split_once(':') {
            Some((prefix, local)) => Ok((local.to_owned(), self.lookup_prefix(prefix)?.to_owned())),
            None => Ok((qname.to_owned(), self.default_namespace().to_owned())),
        }
    }

    fn resolve_attribute(&self, qname: &str) -> Result<(String, String)> {
        match qname.split_once(':') {
            Some((prefix, local)) => Ok((local.to_owned(), self.lookup_prefix(prefix)?.to_owned())),
            None => Ok((qname.to_owned(), String::new())),
        }
    }

    fn lookup_prefix(&self, prefix: &str) -> Result<&str> {
        if prefix == "xml" {
            return Ok(XML_NAMESPACE);
        }
        self.declarations
            .iter()
            .rev()
            .find(|decl| decl.prefix.as_deref() == Some(prefix))
            .map(|decl| decl.uri.as_str())
            .ok_or_else(|| Error::UnboundPrefix {
                prefix: prefix.to_owned(),
                position: self.position(),
            })
    }

    fn default_namespace(&self) -> &str {
        self.declarations
            .iter()
            .rev()
            .find(|decl| decl.prefix.is_none())
            .map(|decl| decl.uri.as_str())
            .unwrap_or("")
    }
}

impl<R: BufRead> TokenSource for PullParser<R> {
    fn event_type(&self) -> EventType {
        self.event
    }

    fn next(&mut self) -> Result<EventType> {
        if self.close_pending {
            self.close_scope();
        }
        if self.event == EventType::EndDocument {
            return Ok(EventType::EndDocument);
        }
        if self.empty_pending {
            self.empty_pending = false;
            self.attributes.clear();
            self.close_pending = true;
            self.event = EventType::EndTag;
            return Ok(EventType::EndTag);
        }

        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map(Event::into_owned);
            let event = event.map_err(|e| self.xml_error(e))?;

            match event {
                Event::Start(start) => {
                    self.open_element(&start)?;
                    return Ok(EventType::StartTag);
                }
                Event::Empty(start) => {
                    self.open_element(&start)?;
                    self.empty_pending = true;
                    return Ok(EventType::StartTag);
                }
                Event::End(end) => {
                    self.close_element(&end)?;
                    return Ok(EventType::EndTag);
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map_err(|e| self.xml_error(e.into()))?
                        .into_owned();
                    if self.accept_text(content)? {
                        return Ok(EventType::Text);
                    }
                }
                Event::CData(cdata) => {
                    let content = std::str::from_utf8(&cdata)?.to_owned();
                    if self.accept_text(content)? {
                        return Ok(EventType::Text);
                    }
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(Error::UnexpectedEof { open: self.depth });
                    }
                    self.event = EventType::EndDocument;
                    return Ok(EventType::EndDocument);
                }
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    fn attribute(&self, index: usize) -> Option<Attribute<'_>> {
        self.attributes.get(index).map(|attr| Attribute {
            name: &attr.name,
            namespace: &attr.namespace,
            value: &attr.value,
        })
    }

    fn namespace_count(&self, depth: usize) -> usize {
        self.scope_ends
            .get(depth)
            .copied()
            .unwrap_or(self.declarations.len())
    }

    fn namespace_declaration(&self, index: usize) -> Option<NamespaceDecl<'_>> {
        self.declarations.get(index).map(|decl| NamespaceDecl {
            prefix: decl.prefix.as_deref(),
            uri: &decl.uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(parser: &mut PullParser<&[u8]>) -> Result<Vec<(EventType, String)>> {
        let mut events = Vec::new();
        loop {
            let event = parser.next()?;
            let label = match event {
                EventType::StartTag | EventType::EndTag => parser.name().to_owned(),
                EventType::Text => parser.text().to_owned(),
                _ => String::new(),
            };
            events.push((event, label));
            if event == EventType::EndDocument {
                return Ok(events);
            }
        }
    }

    #[test]
    fn test_event_sequence() {
        let mut parser = PullParser::from_xml(r#"<?xml version="1.0"?><!-- c --><a x="1"><b>text</b><c/></a>"#);
        assert_eq!(parser.event_type(), EventType::StartDocument);

        let events = drain(&mut parser).unwrap();
        let expected = vec![
            (EventType::StartTag, "a".to_owned()),
            (EventType::StartTag, "b".to_owned()),
            (EventType::Text, "text".to_owned()),
            (EventType::EndTag, "b".to_owned()),
            (EventType::StartTag, "c".to_owned()),
            (EventType::EndTag, "c".to_owned()),
            (EventType::EndTag, "a".to_owned()),
            (EventType::EndDocument, String::new()),
        ];
        assert_eq!(events, expected);
        assert_eq!(parser.next().unwrap(), EventType::EndDocument);
    }

    #[test]
    fn test_depth_and_attributes() {
        let mut parser = PullParser::from_xml(r#"<a x="1" y="&amp;"><b/></a>"#);

        assert_eq!(parser.next().unwrap(), EventType::StartTag);
        assert_eq!(parser.depth(), 1);
        assert_eq!(parser.attribute_count(), 2);
        let y = parser.attribute(1).unwrap();
        assert_eq!(y.name, "y");
        assert_eq!(y.namespace, "");
        assert_eq!(y.value, "&");
        assert!(parser.attribute(2).is_none());

        assert_eq!(parser.next().unwrap(), EventType::StartTag);
        assert_eq!(parser.depth(), 2);
        assert_eq!(parser.attribute_count(), 0);

        assert_eq!(parser.next().unwrap(), EventType::EndTag);
        assert_eq!(parser.depth(), 2);
        assert_eq!(parser.next().unwrap(), EventType::EndTag);
        assert_eq!(parser.depth(), 1);
        assert_eq!(parser.name(), "a");
    }

    #[test]
    fn test_namespace_resolution() {
        let xml = r#"<feed xmlns="urn:atom" xmlns:gd="urn:gd"><entry gd:etag="abc"><gd:title/></entry></feed>"#;
        let mut parser = PullParser::from_xml(xml);

        assert_eq!(parser.next().unwrap(), EventType::StartTag);
        assert_eq!(parser.namespace(), "urn:atom");
        assert_eq!(parser.namespace_count(0), 0);
        assert_eq!(parser.namespace_count(1), 2);
        assert_eq!(
            parser.namespace_declaration(0),
            Some(NamespaceDecl { prefix: None, uri: "urn:atom" })
        );
        assert_eq!(
            parser.namespace_declaration(1),
            Some(NamespaceDecl { prefix: Some("gd"), uri: "urn:gd" })
        );
        // xmlns attributes are declarations, not attributes
        assert_eq!(parser.attribute_count(), 0);

        assert_eq!(parser.next().unwrap(), EventType::StartTag);
        assert_eq!(parser.name(), "entry");
        assert_eq!(parser.namespace(), "urn:atom");
        assert_eq!(parser.namespace_count(2), parser.namespace_count(1));
        let etag = parser.attribute(0).unwrap();
        assert_eq!(etag.name, "etag");
        assert_eq!(etag.namespace, "urn:gd");

        assert_eq!(parser.next().unwrap(), EventType::StartTag);
        assert_eq!(parser.name(), "title");
        assert_eq!(parser.namespace(), "urn:gd");
    }

    #[test]
    fn test_namespace_scope_is_popped() {
        let mut parser = PullParser::from_xml(r#"<a><b xmlns:p="urn:p"><p:c/></b><p:d/></a>"#);
        let result = drain(&mut parser);
        assert!(matches!(
            result,
            Err(Error::UnboundPrefix { ref prefix, .. }) if prefix == "p"
        ));
    }

    #[test]
    fn test_default_namespace_can_be_undeclared() {
        let mut parser = PullParser::from_xml(r#"<a xmlns="urn:a"><b xmlns=""/></a>"#);
        parser.next().unwrap();
        assert_eq!(parser.namespace(), "urn:a");
        parser.next().unwrap();
        assert_eq!(parser.name(), "b");
        assert_eq!(parser.namespace(), "");
    }

    #[test]
    fn test_text_unescape_and_cdata() {
        let mut parser = PullParser::from_xml("<a>&lt;b&gt;<![CDATA[x<y]]></a>");
        let events = drain(&mut parser).unwrap();
        assert_eq!(events[1], (EventType::Text, "<b>".to_owned()));
        assert_eq!(events[2], (EventType::Text, "x<y".to_owned()));
    }

    #[test]
    fn test_whitespace_kept_without_trim() {
        let config = ReaderConfig::new().trim_text(false);
        let mut parser = PullParser::from_xml_with_config("<a> x </a>", config);
        parser.next().unwrap();
        assert_eq!(parser.next().unwrap(), EventType::Text);
        assert_eq!(parser.text(), " x ");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut parser = PullParser::from_xml("<any></p>text</any>");
        assert!(drain(&mut parser).is_err());
    }

    #[test]
    fn test_missing_end_tag() {
        let mut parser = PullParser::from_xml("<any>missing_end_element");
        assert!(drain(&mut parser).is_err());
    }

    #[test]
    fn test_text_before_root() {
        let mut parser = PullParser::from_xml("start_with_text</any>");
        assert!(drain(&mut parser).is_err());
    }
}
