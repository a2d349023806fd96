//! Type-directed XML data binding.
//!
//! Binds an XML element and everything below it into one of three kinds of
//! destination, without per-type parsing code:
//!
//! - a typed [`Object`], whose [`ClassInfo`] names the fields and their types;
//! - a [`GenericXml`] element that records its own name and every attribute,
//!   text chunk and child it sees;
//! - a plain [`ArrayMap`].
//!
//! Slot names follow a fixed composition: `name` for child elements, `@name`
//! for attributes, `alias:name` for names in a namespace with a non-empty
//! alias and `text()` for an element's character data. Unknown names on typed
//! objects are ignored, text that does not fit the declared type is an error.
//!
//! # Example
//!
//! ```
//! use xmlmap::prelude::*;
//!
//! let link = ClassInfo::builder("Link")
//!     .field("@href", Type::Scalar(ScalarType::String))
//!     .build();
//! let entry = ClassInfo::builder("Entry")
//!     .field("title", Type::Scalar(ScalarType::String))
//!     .field("link", Type::list(Type::Class(link)))
//!     .build();
//!
//! let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
//!     <title>Hello</title>
//!     <link href="http://example.com/1"/>
//!     <link href="http://example.com/2"/>
//! </entry>"#;
//!
//! let mut object = entry.new_instance();
//! parse_str(xml, Destination::from(&mut object))?;
//!
//! assert_eq!(object.get("title").and_then(Value::as_str), Some("Hello"));
//! assert_eq!(object.get("link").and_then(Value::as_list).map(<[_]>::len), Some(2));
//! # Ok::<(), xmlmap::Error>(())
//! ```

mod array_buffer;
mod context;
mod destination;
mod error;
mod namespace;
mod parser;
mod scalar;
mod types;
mod value;

pub use xmlmap_pull as pull;

pub use array_buffer::ArrayBuffer;
pub use context::TypeContext;
pub use destination::{slot_name, Destination, Shape, SlotDescriptor, SlotKey, TEXT_CONTENT};
pub use error::{Error, Result};
pub use namespace::NamespaceDictionary;
pub use parser::{
    advance_to_sibling, parse_element, parse_str, CustomizeParser, ElementParser, ParseOptions,
    ParseOutcome,
};
pub use scalar::{parse_scalar, parse_value};
pub use types::{ClassInfo, ClassInfoBuilder, CollectionKind, EnumInfo, FieldInfo, ScalarType, Type};
pub use value::{ArrayMap, Collection, GenericXml, Object, Value};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        parse_element, parse_str, ArrayMap, ClassInfo, CustomizeParser, Destination, EnumInfo,
        GenericXml, NamespaceDictionary, Object, ParseOutcome, ScalarType, Type, Value,
    };
    pub use xmlmap_pull::{PullParser, TokenSource};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
