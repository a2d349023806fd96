use fixtures::*;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use xmlmap::pull::{Attribute, EventType, NamespaceDecl, PullParser, TokenSource};
use xmlmap::{
    advance_to_sibling, parse_element, ClassInfo, CustomizeParser, Destination, ElementParser,
    Error, GenericXml, NamespaceDictionary, ParseOutcome, Type, Value,
};

const FEED: &str = concat!(
    r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">"#,
    "<title>Feed</title>",
    "<entry><id>1</id><app:edited>e1</app:edited></entry>",
    "<entry><id>2</id></entry>",
    "<entry><id>3</id></entry>",
    "</feed>"
);

struct StopAtEntry;

impl CustomizeParser for StopAtEntry {
    fn stop_before_start_tag(&mut self, namespace: &str, name: &str) -> bool {
        namespace == ATOM_NS && name == "entry"
    }
}

struct StopAfterEntry;

impl CustomizeParser for StopAfterEntry {
    fn stop_after_end_tag(&mut self, namespace: &str, name: &str) -> bool {
        namespace == ATOM_NS && name == "entry"
    }
}

fn feed_class() -> Arc<ClassInfo> {
    ClassInfo::builder("Feed").field("title", string()).build()
}

fn entry_class() -> Arc<ClassInfo> {
    ClassInfo::builder("Entry")
        .field("id", string())
        .field("app:edited", string())
        .build()
}

fn read_header<S: TokenSource>(source: &mut S, dictionary: &mut NamespaceDictionary) -> xmlmap::Object {
    let mut feed = feed_class().new_instance();
    let outcome = parse_element(
        source,
        Some(Destination::from(&mut feed)),
        dictionary,
        Some(&mut StopAtEntry),
    )
    .unwrap();
    assert_eq!(outcome, ParseOutcome::Stopped);
    feed
}

#[test]
fn test_header_stops_before_first_entry() {
    ensure_env_logger_initialized();
    let mut source = PullParser::from_xml(FEED);
    let mut dictionary = NamespaceDictionary::new();
    let feed = read_header(&mut source, &mut dictionary);

    assert_eq!(feed.get("title"), Some(&Value::from("Feed")));
    assert_eq!(source.event_type(), EventType::StartTag);
    assert_eq!(source.name(), "entry");
    assert_eq!(source.depth(), 2);
    assert_eq!(dictionary.uri_for_alias("app"), Some(APP_NS));
}

#[test]
fn test_entries_are_read_one_at_a_time() {
    ensure_env_logger_initialized();
    let mut source = PullParser::from_reader(FEED.as_bytes());
    let mut dictionary = NamespaceDictionary::new();
    read_header(&mut source, &mut dictionary);

    let mut entries = Vec::new();
    loop {
        let mut entry = entry_class().new_instance();
        let mut stop = StopAfterEntry;
        let outcome = ElementParser::new(&mut source, &mut dictionary)
            .customize(&mut stop)
            .parse(Some(Destination::from(&mut entry)))
            .unwrap();
        assert_eq!(outcome, ParseOutcome::Stopped);
        assert_eq!(source.event_type(), EventType::EndTag);
        entries.push(entry);
        if !advance_to_sibling(&mut source).unwrap() {
            break;
        }
    }

    let ids: Vec<_> = entries
        .iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(entries[0].get("app:edited"), Some(&Value::from("e1")));
    assert_eq!(entries[1].get("app:edited"), Some(&Value::Null));

    assert_eq!(source.name(), "feed");
    assert_eq!(source.next().unwrap(), EventType::EndDocument);

    let mut entry = entry_class().new_instance();
    let outcome =
        parse_element(&mut source, Some(Destination::from(&mut entry)), &mut dictionary, None).unwrap();
    assert_eq!(outcome, ParseOutcome::EndOfDocument);
}

#[test]
fn test_skip_entry_without_destination() {
    let mut source = PullParser::from_xml(FEED);
    let mut dictionary = NamespaceDictionary::new();
    read_header(&mut source, &mut dictionary);

    let outcome = parse_element(&mut source, None, &mut dictionary, None).unwrap();
    assert_eq!(outcome, ParseOutcome::Finished);
    assert_eq!(source.name(), "entry");
    assert!(advance_to_sibling(&mut source).unwrap());

    let mut entry = entry_class().new_instance();
    parse_element(&mut source, Some(Destination::from(&mut entry)), &mut dictionary, None).unwrap();
    assert_eq!(entry.get("id"), Some(&Value::from("2")));
}

#[test]
fn test_parse_from_end_tag_is_rejected() {
    let mut source = PullParser::from_xml(FEED);
    let mut dictionary = NamespaceDictionary::new();
    read_header(&mut source, &mut dictionary);
    parse_element(&mut source, None, &mut dictionary, None).unwrap();

    let mut entry = entry_class().new_instance();
    let result =
        parse_element(&mut source, Some(Destination::from(&mut entry)), &mut dictionary, None);
    assert!(matches!(result, Err(Error::InvariantViolation(_))), "{:?}", result);
}

#[test]
fn test_truncated_stream_is_malformed() {
    let mut source = PullParser::from_xml(r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>1</id></entry>"#);
    let mut dictionary = NamespaceDictionary::new();
    read_header(&mut source, &mut dictionary);
    parse_element(&mut source, None, &mut dictionary, None).unwrap();

    let result = advance_to_sibling(&mut source);
    assert!(matches!(result, Err(Error::MalformedDocument(_))), "{:?}", result);
}

struct StopBefore(&'static str);

impl CustomizeParser for StopBefore {
    fn stop_before_start_tag(&mut self, _namespace: &str, name: &str) -> bool {
        name == self.0
    }
}

struct StopAfter(&'static str);

impl CustomizeParser for StopAfter {
    fn stop_after_end_tag(&mut self, _namespace: &str, name: &str) -> bool {
        name == self.0
    }
}

#[test]
fn test_stop_keeps_array_items_read_so_far() {
    ensure_env_logger_initialized();
    let class = ClassInfo::builder("Values").field("v", Type::array(int())).build();
    let mut values = class.new_instance();
    let mut source = PullParser::from_xml("<r><v>1</v><v>2</v><stop/><v>3</v></r>");
    let mut dictionary = NamespaceDictionary::new();
    let outcome = parse_element(
        &mut source,
        Some(Destination::from(&mut values)),
        &mut dictionary,
        Some(&mut StopBefore("stop")),
    )
    .unwrap();

    assert_eq!(outcome, ParseOutcome::Stopped);
    assert_eq!(
        values.get("v"),
        Some(&Value::Array(vec![Value::Int32(1), Value::Int32(2)].into_boxed_slice()))
    );
    assert_eq!(source.event_type(), EventType::StartTag);
    assert_eq!(source.name(), "stop");
}

#[test]
fn test_nested_stop_reaches_the_top() {
    ensure_env_logger_initialized();
    let mut xml = GenericXml::new();
    let mut source = PullParser::from_xml("<a><b><c>x</c><e>y</e></b><d>z</d></a>");
    let mut dictionary = NamespaceDictionary::new();
    let outcome = parse_element(
        &mut source,
        Some(Destination::from(&mut xml)),
        &mut dictionary,
        Some(&mut StopAfter("c")),
    )
    .unwrap();

    assert_eq!(outcome, ParseOutcome::Stopped);
    assert_eq!(source.event_type(), EventType::EndTag);
    assert_eq!(source.name(), "c");
    assert_eq!(source.depth(), 3);

    let b = xml.get("b").and_then(Value::as_list).unwrap()[0].as_map().unwrap();
    assert_eq!(text_of(b.get("c"), 0), Some("x"));
    assert!(!b.contains_key("e"));
    assert!(xml.get("d").is_none());

    assert!(advance_to_sibling(&mut source).unwrap());
    assert_eq!(source.name(), "e");
}

/// Replays a fixed token list, without namespaces or attributes, and may end
/// while elements are still open.
struct Replay {
    tokens: Vec<(EventType, &'static str)>,
    position: Option<usize>,
    depth: usize,
    close_pending: bool,
}

impl Replay {
    fn new(tokens: Vec<(EventType, &'static str)>) -> Self {
        Self {
            tokens,
            position: None,
            depth: 0,
            close_pending: false,
        }
    }

    fn current(&self) -> Option<&(EventType, &'static str)> {
        self.position.and_then(|position| self.tokens.get(position))
    }
}

impl TokenSource for Replay {
    fn event_type(&self) -> EventType {
        match self.position {
            None => EventType::StartDocument,
            Some(_) => self.current().map_or(EventType::EndDocument, |(event, _)| *event),
        }
    }

    fn next(&mut self) -> xmlmap::pull::Result<EventType> {
        if self.close_pending {
            self.close_pending = false;
            self.depth -= 1;
        }
        let position = self.position.map_or(0, |position| (position + 1).min(self.tokens.len()));
        self.position = Some(position);
        match self.event_type() {
            EventType::StartTag => self.depth += 1,
            EventType::EndTag => self.close_pending = true,
            _ => {}
        }
        Ok(self.event_type())
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn name(&self) -> &str {
        match self.current() {
            Some((EventType::StartTag | EventType::EndTag, name)) => *name,
            _ => "",
        }
    }

    fn namespace(&self) -> &str {
        ""
    }

    fn text(&self) -> &str {
        match self.current() {
            Some((EventType::Text, text)) => *text,
            _ => "",
        }
    }

    fn attribute_count(&self) -> usize {
        0
    }

    fn attribute(&self, _index: usize) -> Option<Attribute<'_>> {
        None
    }

    fn namespace_count(&self, _depth: usize) -> usize {
        0
    }

    fn namespace_declaration(&self, _index: usize) -> Option<NamespaceDecl<'_>> {
        None
    }
}

#[test]
fn test_end_of_input_keeps_partial_result() {
    ensure_env_logger_initialized();
    let mut source = Replay::new(vec![
        (EventType::StartTag, "feed"),
        (EventType::StartTag, "title"),
        (EventType::Text, "Feed"),
        (EventType::EndTag, "title"),
        (EventType::StartTag, "entry"),
        (EventType::StartTag, "id"),
        (EventType::Text, "1"),
    ]);
    let mut dictionary = NamespaceDictionary::new();
    let mut xml = GenericXml::new();
    let outcome =
        parse_element(&mut source, Some(Destination::from(&mut xml)), &mut dictionary, None).unwrap();

    assert_eq!(outcome, ParseOutcome::EndOfDocument);
    assert_eq!(xml.name(), "feed");
    assert_eq!(text_of(xml.get("title"), 0), Some("Feed"));
    let entry = xml.get("entry").and_then(Value::as_list).unwrap()[0].as_map().unwrap();
    assert_eq!(text_of(entry.get("id"), 0), Some("1"));
    assert!(dictionary.is_empty());
}
