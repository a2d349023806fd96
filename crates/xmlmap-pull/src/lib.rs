//! Namespace-aware pull parser for XML documents.
//!
//! Wraps `quick-xml` in a cursor that is advanced one event at a time and
//! exposes the current element name, namespace URI, attributes, text and the
//! namespace declarations in scope. The binding engine in `xmlmap` consumes
//! documents exclusively through the [`TokenSource`] trait, so any cursor with
//! the same contract can be plugged in.
//!
//! # Example
//!
//! ```
//! use xmlmap_pull::{EventType, PullParser, TokenSource};
//!
//! let mut parser = PullParser::from_xml("<a><b>text</b></a>");
//! let mut names = Vec::new();
//! while parser.next()? != EventType::EndDocument {
//!     if parser.event_type() == EventType::StartTag {
//!         names.push(parser.name().to_owned());
//!     }
//! }
//! assert_eq!(names, ["a", "b"]);
//! # Ok::<(), xmlmap_pull::Error>(())
//! ```

mod error;
mod event;
mod reader;

pub use error::{Error, Result};
pub use event::{Attribute, EventType, NamespaceDecl, TokenSource};
pub use reader::{PullParser, ReaderConfig, XML_NAMESPACE};
