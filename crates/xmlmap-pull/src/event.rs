//! Event kinds and the cursor contract consumed by the binding engine.

use crate::Result;

/// Kind of the event the cursor is currently positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Before the first token of the document.
    StartDocument,
    /// An element start tag. Empty elements are reported as a start tag
    /// immediately followed by an end tag.
    StartTag,
    /// An element end tag.
    EndTag,
    /// A chunk of character data (text or CDATA).
    Text,
    /// The input is exhausted. Further calls to `next` keep returning this.
    EndDocument,
}

impl EventType {
    /// Get the string name for this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartDocument => "START_DOCUMENT",
            Self::StartTag => "START_TAG",
            Self::EndTag => "END_TAG",
            Self::Text => "TEXT",
            Self::EndDocument => "END_DOCUMENT",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An attribute of the current start tag, with its namespace resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Local name (prefix stripped).
    pub name: &'a str,
    /// Namespace URI, empty for unprefixed attributes.
    pub namespace: &'a str,
    /// Unescaped value.
    pub value: &'a str,
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceDecl<'a> {
    /// Declared prefix, `None` for a default namespace declaration.
    pub prefix: Option<&'a str>,
    /// Namespace URI, empty when the default namespace is undeclared.
    pub uri: &'a str,
}

/// A pull-style cursor over XML tokens.
///
/// Namespace declarations are numbered in document order and stay addressable
/// while their element is open: declarations made by the element at depth `d`
/// occupy indices `namespace_count(d - 1)..namespace_count(d)`.
pub trait TokenSource {
    /// The event the cursor is positioned on.
    fn event_type(&self) -> EventType;

    /// Advance to the next event and return its kind.
    fn next(&mut self) -> Result<EventType>;

    /// Element nesting depth. The root element is at depth 1, and an end tag
    /// reports the same depth as its start tag.
    fn depth(&self) -> usize;

    /// Local name of the current start or end tag.
    fn name(&self) -> &str;

    /// Namespace URI of the current start or end tag, empty for no namespace.
    fn namespace(&self) -> &str;

    /// Character data of the current text event.
    fn text(&self) -> &str;

    /// Number of attributes on the current start tag, excluding namespace declarations.
    fn attribute_count(&self) -> usize;

    /// Attribute at `index` on the current start tag.
    fn attribute(&self, index: usize) -> Option<Attribute<'_>>;

    /// Number of namespace declarations in scope at `depth`.
    fn namespace_count(&self, depth: usize) -> usize;

    /// Namespace declaration at `index`.
    fn namespace_declaration(&self, index: usize) -> Option<NamespaceDecl<'_>>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn event_type(&self) -> EventType {
        (**self).event_type()
    }

    fn next(&mut self) -> Result<EventType> {
        (**self).next()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn namespace(&self) -> &str {
        (**self).namespace()
    }

    fn text(&self) -> &str {
        (**self).text()
    }

    fn attribute_count(&self) -> usize {
        (**self).attribute_count()
    }

    fn attribute(&self, index: usize) -> Option<Attribute<'_>> {
        (**self).attribute(index)
    }

    fn namespace_count(&self, depth: usize) -> usize {
        (**self).namespace_count(depth)
    }

    fn namespace_declaration(&self, index: usize) -> Option<NamespaceDecl<'_>> {
        (**self).namespace_declaration(index)
    }
}
