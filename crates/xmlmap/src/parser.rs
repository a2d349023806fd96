//! Recursive descent binding of XML elements into destinations.

use log::{debug, trace};
use xmlmap_pull::{EventType, PullParser, TokenSource};

use crate::array_buffer::ArrayBuffer;
use crate::context::TypeContext;
use crate::destination::{slot_name, Destination, Shape, SlotDescriptor, SlotKey, TEXT_CONTENT};
use crate::namespace::NamespaceDictionary;
use crate::scalar::parse_value;
use crate::types::{ScalarType, Type};
use crate::value::Value;
use crate::{Error, Result};

/// Hooks that end a parse early at element boundaries.
///
/// Both methods default to never stopping.
pub trait CustomizeParser {
    /// Called before a child start tag is processed. Returning `true` stops
    /// the parse with the cursor left on that start tag.
    fn stop_before_start_tag(&mut self, namespace: &str, name: &str) -> bool {
        let _ = (namespace, name);
        false
    }

    /// Called when an element's end tag is reached. Returning `true` stops
    /// the parse with the cursor left on that end tag.
    fn stop_after_end_tag(&mut self, namespace: &str, name: &str) -> bool {
        let _ = (namespace, name);
        false
    }
}

/// How a parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseOutcome {
    /// The element's end tag was reached.
    Finished,
    /// A [`CustomizeParser`] hook asked to stop.
    Stopped,
    /// The document ended.
    EndOfDocument,
}

impl ParseOutcome {
    /// Check if the parse ended before the element's end tag was processed
    /// normally, either by a hook or because the document ran out.
    pub fn is_stopped(&self) -> bool {
        !matches!(self, Self::Finished)
    }
}

/// Parse settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting bound into destinations, `None` for no limit.
    pub max_depth: Option<usize>,
    /// Join successive text chunks of a string `text()` field instead of
    /// keeping only the last one.
    pub concatenate_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(512),
            concatenate_text: true,
        }
    }
}

impl ParseOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set whether text chunks are concatenated.
    pub fn concatenate_text(mut self, concatenate: bool) -> Self {
        self.concatenate_text = concatenate;
        self
    }
}

/// Parse the element at the cursor into `destination`.
///
/// The cursor must be on or before the element's start tag. On return it is
/// on the element's end tag, or on the tag where a `customize` hook stopped.
/// Without a destination the element is read and discarded.
pub fn parse_element<S>(
    source: &mut S,
    destination: Option<Destination<'_>>,
    dictionary: &mut NamespaceDictionary,
    customize: Option<&mut dyn CustomizeParser>,
) -> Result<ParseOutcome>
where
    S: TokenSource + ?Sized,
{
    let mut parser = ElementParser::new(source, dictionary);
    if let Some(customize) = customize {
        parser = parser.customize(customize);
    }
    parser.parse(destination)
}

/// Parse the root element of an in-memory document into `destination`,
/// returning the namespace aliases discovered on the way.
pub fn parse_str(xml: &str, destination: Destination<'_>) -> Result<NamespaceDictionary> {
    let mut source = PullParser::from_xml(xml);
    let mut dictionary = NamespaceDictionary::new();
    parse_element(&mut source, Some(destination), &mut dictionary, None)?;
    Ok(dictionary)
}

/// Move the cursor from an element's end tag to the start tag of its next
/// sibling.
///
/// Returns `false` when the parent's end tag or the end of the document is
/// reached first.
pub fn advance_to_sibling<S>(source: &mut S) -> Result<bool>
where
    S: TokenSource + ?Sized,
{
    loop {
        match source.next()? {
            EventType::StartTag => return Ok(true),
            EventType::EndTag | EventType::EndDocument => return Ok(false),
            EventType::Text | EventType::StartDocument => {}
        }
    }
}

/// Binding engine for one top-level element.
///
/// Owns the type context for the duration of the parse and borrows the
/// cursor, the namespace dictionary and the optional stop hooks.
pub struct ElementParser<'p, S: ?Sized> {
    source: &'p mut S,
    dictionary: &'p mut NamespaceDictionary,
    customize: Option<&'p mut dyn CustomizeParser>,
    context: TypeContext,
    options: ParseOptions,
    depth: usize,
}

impl<'p, S> ElementParser<'p, S>
where
    S: TokenSource + ?Sized,
{
    /// Create an engine over `source`.
    pub fn new(source: &'p mut S, dictionary: &'p mut NamespaceDictionary) -> Self {
        Self {
            source,
            dictionary,
            customize: None,
            context: TypeContext::new(),
            options: ParseOptions::default(),
            depth: 0,
        }
    }

    /// Install stop hooks.
    pub fn customize(mut self, customize: &'p mut dyn CustomizeParser) -> Self {
        self.customize = Some(customize);
        self
    }

    /// Replace the parse options.
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Declare the type of the top-level destination, so that type variables
    /// of its class resolve.
    pub fn root_type(mut self, ty: Type) -> Self {
        self.context.push(ty);
        self
    }

    /// The type context.
    pub fn context(&self) -> &TypeContext {
        &self.context
    }

    /// Parse the element at the cursor.
    pub fn parse(&mut self, destination: Option<Destination<'_>>) -> Result<ParseOutcome> {
        self.depth = 1;
        let result = self.parse_frame(destination, &Type::Any);
        self.depth = 0;
        result
    }

    fn parse_frame(
        &mut self,
        mut destination: Option<Destination<'_>>,
        value_type: &Type,
    ) -> Result<ParseOutcome> {
        if self.source.event_type() == EventType::StartDocument {
            self.source.next()?;
        }
        match self.source.event_type() {
            EventType::StartTag => {}
            EventType::EndDocument => return Ok(ParseOutcome::EndOfDocument),
            other => {
                return Err(Error::InvariantViolation(format!(
                    "expected a start tag, found {}",
                    other
                )))
            }
        }

        self.declare_namespaces();
        debug!("enter <{}> at depth {}", self.source.name(), self.depth);

        if let Some(Destination::Generic(element)) = &mut destination {
            let alias = self.dictionary.alias_for_uri_or_err(self.source.namespace())?;
            element.set_name(slot_name(false, alias, self.source.name()));
        }

        if let Some(dest) = destination.as_mut() {
            for index in 0..self.source.attribute_count() {
                let Some(attribute) = self.source.attribute(index) else {
                    continue;
                };
                let alias = if attribute.namespace.is_empty() {
                    ""
                } else {
                    self.dictionary.alias_for_uri_or_err(attribute.namespace)?
                };
                let name = slot_name(true, alias, attribute.name);
                let value = attribute.value.to_owned();
                self.write_text(dest, &name, &value, value_type, false)?;
            }
        }

        let mut arrays = ArrayBuffer::new();
        let mut text_written = false;
        let outcome = loop {
            match self.source.next()? {
                EventType::EndDocument => break ParseOutcome::EndOfDocument,
                EventType::EndTag => {
                    let stop = match self.customize.as_deref_mut() {
                        Some(customize) => {
                            customize.stop_after_end_tag(self.source.namespace(), self.source.name())
                        }
                        None => false,
                    };
                    if stop {
                        debug!("stopped after </{}>", self.source.name());
                        break ParseOutcome::Stopped;
                    }
                    break ParseOutcome::Finished;
                }
                EventType::Text => {
                    if let Some(dest) = destination.as_mut() {
                        let text = self.source.text().to_owned();
                        self.write_text(dest, TEXT_CONTENT, &text, value_type, text_written)?;
                        text_written = true;
                    }
                }
                EventType::StartTag => {
                    let stop = match self.customize.as_deref_mut() {
                        Some(customize) => customize
                            .stop_before_start_tag(self.source.namespace(), self.source.name()),
                        None => false,
                    };
                    if stop {
                        debug!("stopped before <{}>", self.source.name());
                        break ParseOutcome::Stopped;
                    }
                    let child = match destination.as_mut() {
                        Some(dest) => self.parse_child(dest, value_type, &mut arrays)?,
                        None => self.skip_element(false)?.1,
                    };
                    if child.is_stopped() || self.source.event_type() == EventType::EndDocument {
                        break match child {
                            ParseOutcome::Finished => ParseOutcome::EndOfDocument,
                            other => other,
                        };
                    }
                }
                EventType::StartDocument => {}
            }
        };

        if let Some(dest) = destination.as_mut() {
            arrays.materialize_all(dest);
        }
        debug!("leave depth {} ({:?})", self.depth, outcome);
        Ok(outcome)
    }

    fn declare_namespaces(&mut self) {
        let depth = self.source.depth();
        let start = self.source.namespace_count(depth.saturating_sub(1));
        let end = self.source.namespace_count(depth);
        for index in start..end {
            let Some(declaration) = self.source.namespace_declaration(index) else {
                continue;
            };
            if declaration.uri.is_empty() {
                continue;
            }
            self.dictionary
                .declare(declaration.uri, declaration.prefix.unwrap_or(""));
        }
    }

    /// Write an attribute value or a text chunk.
    ///
    /// `continues` is set for the second and later text chunks of the same
    /// element. Only those are joined onto the slot; the first chunk replaces
    /// whatever the slot held before the element started.
    fn write_text(
        &mut self,
        dest: &mut Destination<'_>,
        name: &str,
        text: &str,
        value_type: &Type,
        continues: bool,
    ) -> Result<()> {
        let slot = dest.classify(name, value_type, &self.context);
        let Some(key) = slot.key else {
            return Ok(());
        };

        let joined;
        let mut text = text;
        if continues
            && self.options.concatenate_text
            && name == TEXT_CONTENT
            && matches!(key, SlotKey::Field(_))
            && accepts_text(&slot.ty)
        {
            if let Some(previous) = dest.get(&key).and_then(Value::as_str) {
                joined = format!("{}{}", previous, text);
                text = &joined;
            }
        }

        let value = parse_value(&slot.ty, text)?;
        trace!("{} = {:?}", name, value);
        dest.put_leaf(&key, value);
        Ok(())
    }

    fn parse_child(
        &mut self,
        dest: &mut Destination<'_>,
        value_type: &Type,
        arrays: &mut ArrayBuffer,
    ) -> Result<ParseOutcome> {
        self.declare_namespaces();
        let alias = self.dictionary.alias_for_uri_or_err(self.source.namespace())?;
        let name = slot_name(false, alias, self.source.name());
        let slot = dest.classify(&name, value_type, &self.context);
        let SlotDescriptor { key, ty, shape } = slot;

        match (key, shape) {
            (Some(key), Shape::Primitive | Shape::Enum) => {
                let (text, outcome) = self.skip_element(true)?;
                if let Some(text) = text {
                    let value = parse_value(&ty, &text)?;
                    trace!("{} = {:?}", name, value);
                    dest.put_leaf(&key, value);
                }
                Ok(outcome)
            }
            (Some(key), Shape::MapLike | Shape::NestedObject) => {
                let mut nested = new_nested(&ty)?;
                let outcome = self.descend(ty.clone(), &mut nested)?;
                dest.store_nested(&key, nested, &ty);
                Ok(outcome)
            }
            (Some(key), Shape::Array | Shape::Collection) => {
                let component = ty.component().cloned().unwrap_or(Type::Any);
                let component = self.context.resolve(&component);
                let (item, outcome) = self.parse_item(&component)?;
                let Some(item) = item else {
                    return Ok(outcome);
                };
                match &ty {
                    Type::Collection(kind, _) => {
                        dest.ensure_collection(&key, *kind)?.push(item);
                    }
                    _ => arrays.put(key, &component, item),
                }
                Ok(outcome)
            }
            (None, _) | (_, Shape::Ignored) => {
                trace!("ignoring <{}>", name);
                Ok(self.skip_element(false)?.1)
            }
        }
    }

    /// Parse one child of an array or collection slot.
    fn parse_item(&mut self, component: &Type) -> Result<(Option<Value>, ParseOutcome)> {
        if component.is_leaf() {
            let (text, outcome) = self.skip_element(true)?;
            let value = match text {
                Some(text) => parse_value(component, &text)?,
                None => Value::Null,
            };
            return Ok((Some(value), outcome));
        }
        if component.is_map_like() || component.raw_class().is_some() {
            let mut nested = new_nested(component)?;
            let outcome = self.descend(component.clone(), &mut nested)?;
            return Ok((Some(nested), outcome));
        }
        debug!("skipping item of unsupported component type {}", component);
        Ok((None, self.skip_element(false)?.1))
    }

    /// Recurse into the element at the cursor with `nested` as destination.
    ///
    /// `ty` is pushed onto the type context for the duration of the call.
    fn descend(&mut self, ty: Type, nested: &mut Value) -> Result<ParseOutcome> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }
        let destination = Destination::from_value(nested)?;
        let value_type = ty.map_value();

        let saved = self.context.len();
        self.context.push(ty);
        let value_type = self.context.resolve(&value_type);
        self.depth += 1;
        let result = self.parse_frame(Some(destination), &value_type);
        self.depth -= 1;
        self.context.truncate(saved);
        result
    }

    /// Read to the end of the current element, optionally collecting the text
    /// directly inside it. Nested markup is skipped.
    fn skip_element(&mut self, capture: bool) -> Result<(Option<String>, ParseOutcome)> {
        let mut text: Option<String> = None;
        let mut level = 1usize;
        while level != 0 {
            match self.source.next()? {
                EventType::EndDocument => return Ok((text, ParseOutcome::EndOfDocument)),
                EventType::StartTag => level += 1,
                EventType::EndTag => level -= 1,
                EventType::Text if capture && level == 1 => {
                    text.get_or_insert_with(String::new).push_str(self.source.text());
                }
                _ => {}
            }
        }
        Ok((text, ParseOutcome::Finished))
    }
}

/// Text slots whose chunks are joined rather than replaced.
fn accepts_text(ty: &Type) -> bool {
    matches!(ty, Type::Scalar(ScalarType::String)) || ty.is_dynamic()
}

fn new_nested(ty: &Type) -> Result<Value> {
    ty.new_instance()
        .filter(|value| matches!(value, Value::Object(_) | Value::Element(_) | Value::Map(_)))
        .ok_or_else(|| Error::InvariantViolation(format!("cannot bind an element into {}", ty)))
}
