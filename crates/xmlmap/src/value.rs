//! Bound values: scalars, typed objects, generic elements, maps and sequences.

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;
use std::sync::Arc;

use hashbrown::DefaultHashBuilder;
use hashbrown::{HashMap, HashTable};

use crate::types::{ClassInfo, CollectionKind};

/// A value produced by binding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Unset slot.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Single character.
    Char(char),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Text.
    String(String),
    /// Enum value name.
    Enum(String),
    /// Instance of a registered class.
    Object(Object),
    /// Generic XML element.
    Element(GenericXml),
    /// String-keyed map.
    Map(ArrayMap),
    /// Fixed-length array.
    Array(Box<[Value]>),
    /// Growable collection.
    Collection(Collection),
}

impl Value {
    /// Check if this is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as char.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64 (widening from any integer that fits).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(v) => Some(*v as i64),
            Self::Int16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt8(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as u64 (widening from any non-negative integer).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt8(v) => Some(*v as u64),
            Self::UInt16(v) => Some(*v as u64),
            Self::UInt32(v) => Some(*v as u64),
            Self::UInt64(v) => Some(*v),
            Self::Int8(_) | Self::Int16(_) | Self::Int32(_) | Self::Int64(_) => {
                self.as_i64().and_then(|v| u64::try_from(v).ok())
            }
            _ => None,
        }
    }

    /// Try to get as f32.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string. Enum values are returned by name.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get as an enum value name.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the items of an array or collection.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(&items[..]),
            Self::Collection(collection) => Some(collection.items()),
            _ => None,
        }
    }

    /// Try to get as a collection.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Try to get as a typed object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Try to get as a generic element.
    pub fn as_element(&self) -> Option<&GenericXml> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Try to get as a map.
    pub fn as_map(&self) -> Option<&ArrayMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt8(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(s) => f.write_str(s),
            Self::Enum(s) => f.write_str(s),
            Self::Object(object) => {
                write!(f, "{} ", object.class().name())?;
                write_entries(f, object.iter())
            }
            Self::Element(element) => {
                write!(f, "<{}> ", element.name())?;
                write_entries(f, element.iter())
            }
            Self::Map(map) => write_entries(f, map.iter()),
            Self::Array(items) => write_items(f, items),
            Self::Collection(collection) => write_items(f, collection.items()),
        }
    }
}

fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", key, value)?;
    }
    f.write_str("}")
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

/// Instance of a registered class. Field values follow declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    class: Arc<ClassInfo>,
    values: Vec<Value>,
}

impl Object {
    /// Create an instance with every field null.
    pub fn new(class: Arc<ClassInfo>) -> Self {
        let values = vec![Value::Null; class.fields().len()];
        Self { class, values }
    }

    /// The class of this instance.
    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    /// Field values, in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    /// Get a field value by slot name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let (index, _) = self.class.field(name)?;
        self.values.get(index)
    }

    /// Set a field value by slot name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.class.field(name) {
            Some((index, _)) => match self.values.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Iterate over `(field name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.class
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .zip(self.values.iter())
    }
}

/// A generic XML element.
///
/// Records its own qualified name and collects attributes, text and children
/// by name. An element may also carry declared fields; names matching one of
/// them bind like a typed object, everything else lands in the entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericXml {
    name: String,
    class: Option<Arc<ClassInfo>>,
    fields: Vec<Value>,
    entries: ArrayMap,
}

impl GenericXml {
    /// Create an element without declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element, optionally with declared fields.
    pub fn with_class(class: Option<Arc<ClassInfo>>) -> Self {
        let fields = class
            .as_ref()
            .map(|c| vec![Value::Null; c.fields().len()])
            .unwrap_or_default();
        Self {
            name: String::new(),
            class,
            fields,
            entries: ArrayMap::new(),
        }
    }

    /// Qualified name (`alias:name`, or `name` for the empty alias).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Declared fields, if any.
    pub fn class(&self) -> Option<&Arc<ClassInfo>> {
        self.class.as_ref()
    }

    /// Values of the declared fields.
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Value] {
        &mut self.fields
    }

    /// Undeclared entries.
    pub fn entries(&self) -> &ArrayMap {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut ArrayMap {
        &mut self.entries
    }

    /// Get a value by slot name, declared fields first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some((index, _)) = self.class.as_ref().and_then(|c| c.field(name)) {
            return self.fields.get(index);
        }
        self.entries.get(name)
    }

    /// Set a value by slot name, declared fields first.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some((index, _)) = self.class.as_ref().and_then(|c| c.field(&name)) {
            if let Some(slot) = self.fields.get_mut(index) {
                *slot = value;
                return;
            }
        }
        self.entries.insert(name, value);
    }

    /// Iterate over non-null declared fields followed by the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let declared = self
            .class
            .iter()
            .flat_map(|c| c.fields().iter().map(|field| field.name.as_str()))
            .zip(self.fields.iter())
            .filter(|(_, value)| !value.is_null());
        declared.chain(self.entries.iter())
    }
}

/// String-keyed map that keeps insertion order.
///
/// Lookups go through a key index, so building a map with many distinct keys
/// stays linear.
#[derive(Clone, Default)]
pub struct ArrayMap {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ArrayMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let position = *self.index.get(key)?;
        Some(&self.entries[position].1)
    }

    /// Get a mutable value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let position = *self.index.get(key)?;
        Some(&mut self.entries[position].1)
    }

    /// Get the value for `key`, inserting `default()` at the end if absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> Value) -> &mut Value {
        let position = match self.index.get(key).copied() {
            Some(position) => position,
            None => self.push(key.to_owned(), default()),
        };
        &mut self.entries[position].1
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert a value, replacing in place and returning any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.push(key, value);
                None
            }
        }
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (key, _) in &self.entries[position..] {
            if let Some(shifted) = self.index.get_mut(key.as_str()) {
                *shifted -= 1;
            }
        }
        Some(value)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn push(&mut self, key: String, value: Value) -> usize {
        let position = self.entries.len();
        self.index.insert(key.clone(), position);
        self.entries.push((key, value));
        position
    }
}

impl PartialEq for ArrayMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for ArrayMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayMap").field("entries", &self.entries).finish()
    }
}

impl FromIterator<(String, Value)> for ArrayMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A growable collection of a given runtime kind.
///
/// Sets keep a hash index over their items for duplicate checks.
#[derive(Clone)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<Value>,
    members: HashTable<usize>,
    hasher: DefaultHashBuilder,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            members: HashTable::new(),
            hasher: DefaultHashBuilder::default(),
        }
    }

    /// Runtime kind.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item. Sets ignore items already present.
    pub fn push(&mut self, value: Value) -> bool {
        if self.kind != CollectionKind::Set {
            self.items.push(value);
            return true;
        }

        let hash = self.hasher.hash_one(HashedValue(&value));
        let items = &self.items;
        if self.members.find(hash, |&i| items[i] == value).is_some() {
            return false;
        }
        let position = self.items.len();
        self.items.push(value);
        let (items, hasher) = (&self.items, &self.hasher);
        self.members
            .insert_unique(hash, position, |&i| hasher.hash_one(HashedValue(&items[i])));
        true
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.items == other.items
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("items", &self.items)
            .finish()
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut collection = Self::new(CollectionKind::List);
        collection.items = iter.into_iter().collect();
        collection
    }
}

/// Hashes a value consistently with its `PartialEq`: values that compare
/// equal hash equal. `0.0` and `-0.0` share a hash.
struct HashedValue<'a>(&'a Value);

impl Hash for HashedValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let value = self.0;
        mem::discriminant(value).hash(state);
        match value {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::Int8(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::UInt8(v) => v.hash(state),
            Value::UInt16(v) => v.hash(state),
            Value::UInt32(v) => v.hash(state),
            Value::UInt64(v) => v.hash(state),
            Value::Float(v) => (if *v == 0.0 { 0 } else { v.to_bits() }).hash(state),
            Value::Double(v) => (if *v == 0.0 { 0 } else { v.to_bits() }).hash(state),
            Value::String(s) | Value::Enum(s) => s.hash(state),
            Value::Object(object) => hash_items(object.values(), state),
            Value::Element(element) => {
                element.name().hash(state);
                hash_items(element.fields(), state);
                hash_entries(element.entries(), state);
            }
            Value::Map(map) => hash_entries(map, state),
            Value::Array(items) => hash_items(items, state),
            Value::Collection(collection) => hash_items(collection.items(), state),
        }
    }
}

fn hash_items<H: Hasher>(items: &[Value], state: &mut H) {
    items.len().hash(state);
    for item in items {
        HashedValue(item).hash(state);
    }
}

fn hash_entries<H: Hasher>(map: &ArrayMap, state: &mut H) {
    map.len().hash(state);
    for (key, value) in map.iter() {
        key.hash(state);
        HashedValue(value).hash(state);
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    use super::{ArrayMap, Collection, GenericXml, Object, Value};

    impl Serialize for Value {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(v) => serializer.serialize_bool(*v),
                Value::Char(v) => serializer.serialize_char(*v),
                Value::Int8(v) => serializer.serialize_i8(*v),
                Value::Int16(v) => serializer.serialize_i16(*v),
                Value::Int32(v) => serializer.serialize_i32(*v),
                Value::Int64(v) => serializer.serialize_i64(*v),
                Value::UInt8(v) => serializer.serialize_u8(*v),
                Value::UInt16(v) => serializer.serialize_u16(*v),
                Value::UInt32(v) => serializer.serialize_u32(*v),
                Value::UInt64(v) => serializer.serialize_u64(*v),
                Value::Float(v) => serializer.serialize_f32(*v),
                Value::Double(v) => serializer.serialize_f64(*v),
                Value::String(s) | Value::Enum(s) => serializer.serialize_str(s),
                Value::Object(object) => object.serialize(serializer),
                Value::Element(element) => element.serialize(serializer),
                Value::Map(map) => map.serialize(serializer),
                Value::Array(items) => serialize_items(items, serializer),
                Value::Collection(collection) => collection.serialize(serializer),
            }
        }
    }

    fn serialize_items<S: Serializer>(items: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }

    fn serialize_entries<'a, S: Serializer>(
        entries: impl Iterator<Item = (&'a str, &'a Value)>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    impl Serialize for Object {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_entries(self.iter(), serializer)
        }
    }

    impl Serialize for GenericXml {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_entries(self.iter(), serializer)
        }
    }

    impl Serialize for ArrayMap {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_entries(self.iter(), serializer)
        }
    }

    impl Serialize for Collection {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_items(self.items(), serializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScalarType, Type};

    #[test]
    fn test_array_map_keeps_order() {
        let mut map = ArrayMap::new();
        map.insert("b", Value::Int32(1));
        map.insert("a", Value::Int32(2));
        assert_eq!(map.insert("b", Value::Int32(3)), Some(Value::Int32(1)));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(map.get("b"), Some(&Value::Int32(3)));

        assert_eq!(map.remove("b"), Some(Value::Int32(3)));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn test_set_drops_duplicates() {
        let mut set = Collection::new(CollectionKind::Set);
        assert!(set.push(Value::from("a")));
        assert!(!set.push(Value::from("a")));
        assert!(set.push(Value::from("b")));
        assert_eq!(set.len(), 2);

        let mut list = Collection::new(CollectionKind::List);
        list.push(Value::from("a"));
        list.push(Value::from("a"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_array_map_index_follows_removal() {
        let mut map: ArrayMap = ["a", "b", "c", "d"]
            .into_iter()
            .enumerate()
            .map(|(i, key)| (key.to_owned(), Value::Int32(i as i32)))
            .collect();

        assert_eq!(map.remove("b"), Some(Value::Int32(1)));
        assert_eq!(map.remove("b"), None);
        assert_eq!(map.get("c"), Some(&Value::Int32(2)));
        assert_eq!(map.get("d"), Some(&Value::Int32(3)));

        *map.get_or_insert_with("c", || Value::Null) = Value::Int32(20);
        map.get_or_insert_with("b", || Value::Int32(10));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "c", "d", "b"]);
        assert_eq!(map.get("c"), Some(&Value::Int32(20)));
        assert_eq!(map.get("b"), Some(&Value::Int32(10)));
    }

    #[test]
    fn test_array_map_many_distinct_keys() {
        let mut map = ArrayMap::new();
        for i in 0..20_000 {
            map.get_or_insert_with(&format!("name{}", i), || Value::Int32(i));
        }
        assert_eq!(map.len(), 20_000);
        assert_eq!(map.get("name0"), Some(&Value::Int32(0)));
        assert_eq!(map.get("name19999"), Some(&Value::Int32(19_999)));
        assert_eq!(map.keys().nth(12_345), Some("name12345"));
    }

    #[test]
    fn test_set_compares_by_value() {
        let mut set = Collection::new(CollectionKind::Set);
        assert!(set.push(Value::Int32(1)));
        assert!(set.push(Value::Int64(1)));
        assert!(!set.push(Value::Int32(1)));
        assert!(set.push(Value::Double(0.0)));
        assert!(!set.push(Value::Double(-0.0)));
        assert!(set.push(Value::Enum("A".into())));
        assert!(set.push(Value::from("A")));

        let mut map = ArrayMap::new();
        map.insert("text()", Value::from("x"));
        assert!(set.push(Value::Map(map.clone())));
        assert!(!set.push(Value::Map(map)));
        assert_eq!(set.len(), 6);

        for i in 0..10_000 {
            set.push(Value::from(format!("item{}", i)));
            set.push(Value::from(format!("item{}", i)));
        }
        assert_eq!(set.len(), 10_006);
        assert_eq!(set.items()[6], Value::from("item0"));
    }

    #[test]
    fn test_object_get_set() {
        let class = ClassInfo::builder("Link")
            .field("@href", Type::Scalar(ScalarType::String))
            .field("@length", Type::Scalar(ScalarType::UInt32))
            .build();
        let mut link = Object::new(class);
        assert!(link.set("@href", Value::from("http://example.com")));
        assert!(!link.set("@rel", Value::from("self")));
        assert_eq!(link.get("@href").and_then(Value::as_str), Some("http://example.com"));
        assert_eq!(link.get("@length"), Some(&Value::Null));
    }

    #[test]
    fn test_generic_declared_fields_first() {
        let class = ClassInfo::builder("Entry")
            .field("title", Type::Scalar(ScalarType::String))
            .build();
        let mut entry = GenericXml::with_class(Some(class));
        entry.set("title", Value::from("declared"));
        entry.set("summary", Value::from("extra"));
        assert_eq!(entry.fields()[0], Value::from("declared"));
        assert_eq!(entry.entries().len(), 1);
        assert_eq!(entry.get("summary"), Some(&Value::from("extra")));
        assert_eq!(entry.iter().count(), 2);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::UInt64(7).as_i64(), Some(7));
        assert_eq!(Value::Int8(-1).as_u64(), None);
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Enum("ENUM_1".into()).as_str(), Some("ENUM_1"));
        assert_eq!(Value::String("x".into()).as_enum(), None);
    }

    #[test]
    fn test_display() {
        let mut map = ArrayMap::new();
        map.insert("a", Value::Int32(1));
        map.insert(
            "b",
            Value::Collection([Value::from("x"), Value::from("y")].into_iter().collect()),
        );
        assert_eq!(Value::Map(map).to_string(), "{a: 1, b: [x, y]}");
    }
}
