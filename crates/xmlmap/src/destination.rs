//! Uniform access to the three kinds of binding destination.

use std::sync::Arc;

use crate::context::TypeContext;
use crate::types::{ClassInfo, CollectionKind, Type};
use crate::value::{ArrayMap, Collection, GenericXml, Object, Value};
use crate::{Error, Result};

/// Slot name used for an element's own character data.
pub const TEXT_CONTENT: &str = "text()";

/// Compose the slot name for an element or attribute.
///
/// Attributes get an `@` prefix, names in a namespace with a non-empty alias
/// get an `alias:` prefix.
pub fn slot_name(is_attribute: bool, alias: &str, name: &str) -> String {
    let mut slot = String::with_capacity(alias.len() + name.len() + 2);
    if is_attribute {
        slot.push('@');
    }
    if !alias.is_empty() {
        slot.push_str(alias);
        slot.push(':');
    }
    slot.push_str(name);
    slot
}

/// How a child element is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No slot; the subtree is skipped.
    Ignored,
    /// Scalar leaf.
    Primitive,
    /// Enum leaf.
    Enum,
    /// Instance of a registered class.
    NestedObject,
    /// Generic map or element.
    MapLike,
    /// Fixed-length array, filled after the parent element ends.
    Array,
    /// Growable collection, filled one child at a time.
    Collection,
}

impl Shape {
    /// Shape of a child element bound to a slot of type `ty`.
    pub fn of(ty: &Type) -> Self {
        match ty {
            Type::Scalar(_) => Self::Primitive,
            Type::Enum(_) => Self::Enum,
            Type::Class(_) | Type::Parameterized { .. } => Self::NestedObject,
            Type::Map(_) | Type::Generic(_) | Type::Any | Type::Var(_) | Type::Wildcard(_) => {
                Self::MapLike
            }
            Type::Array(_) => Self::Array,
            Type::Collection(..) => Self::Collection,
        }
    }

    /// Check if the shape is a scalar or enum leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Primitive | Self::Enum)
    }
}

/// Address of a slot within a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Declared field, by index.
    Field(usize),
    /// Undeclared entry of a generic element or map, by name.
    Entry(String),
}

/// Resolved metadata for one named attribute or child.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDescriptor {
    /// Where the value goes, `None` when the name is ignored.
    pub key: Option<SlotKey>,
    /// Declared type with type variables resolved.
    pub ty: Type,
    /// How a child element with this name is bound.
    pub shape: Shape,
}

impl SlotDescriptor {
    fn ignored() -> Self {
        Self {
            key: None,
            ty: Type::Any,
            shape: Shape::Ignored,
        }
    }
}

/// The value being populated by one element.
pub enum Destination<'a> {
    /// Instance of a registered class. Unknown names are ignored.
    Typed(&'a mut Object),
    /// Generic element. Records its own name; repeated children accumulate.
    Generic(&'a mut GenericXml),
    /// Plain map. Repeated children accumulate.
    Map(&'a mut ArrayMap),
}

impl<'a> From<&'a mut Object> for Destination<'a> {
    fn from(object: &'a mut Object) -> Self {
        Self::Typed(object)
    }
}

impl<'a> From<&'a mut GenericXml> for Destination<'a> {
    fn from(element: &'a mut GenericXml) -> Self {
        Self::Generic(element)
    }
}

impl<'a> From<&'a mut ArrayMap> for Destination<'a> {
    fn from(map: &'a mut ArrayMap) -> Self {
        Self::Map(map)
    }
}

impl<'a> Destination<'a> {
    /// View a value as a destination. Only objects, generic elements and maps
    /// can be populated.
    pub fn from_value(value: &'a mut Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Self::Typed(object)),
            Value::Element(element) => Ok(Self::Generic(element)),
            Value::Map(map) => Ok(Self::Map(map)),
            other => Err(Error::InvariantViolation(format!(
                "cannot bind an element into {}",
                variant_name(other)
            ))),
        }
    }

    /// Declared fields, if any.
    pub fn class(&self) -> Option<&Arc<ClassInfo>> {
        match self {
            Self::Typed(object) => Some(object.class()),
            Self::Generic(element) => element.class(),
            Self::Map(_) => None,
        }
    }

    /// Resolve the slot for a composed name.
    ///
    /// Declared fields take their declared type. Undeclared names are ignored
    /// by typed objects and bound as entries of type `value_type` by generic
    /// elements and maps.
    pub fn classify(&self, name: &str, value_type: &Type, context: &TypeContext) -> SlotDescriptor {
        if let Some((index, field)) = self.class().and_then(|class| class.field(name)) {
            let ty = context.resolve(&field.ty);
            return SlotDescriptor {
                key: Some(SlotKey::Field(index)),
                shape: Shape::of(&ty),
                ty,
            };
        }
        match self {
            Self::Typed(_) => SlotDescriptor::ignored(),
            Self::Generic(_) | Self::Map(_) => {
                let ty = context.resolve(value_type);
                SlotDescriptor {
                    key: Some(SlotKey::Entry(name.to_owned())),
                    shape: Shape::of(&ty),
                    ty,
                }
            }
        }
    }

    /// Current value of a slot.
    pub fn get(&self, key: &SlotKey) -> Option<&Value> {
        match (self, key) {
            (Self::Typed(object), SlotKey::Field(index)) => object.values().get(*index),
            (Self::Generic(element), SlotKey::Field(index)) => element.fields().get(*index),
            (Self::Generic(element), SlotKey::Entry(name)) => element.entries().get(name),
            (Self::Map(map), SlotKey::Entry(name)) => map.get(name),
            _ => None,
        }
    }

    fn slot_mut(&mut self, key: &SlotKey) -> Option<&mut Value> {
        match self {
            Self::Typed(object) => match key {
                SlotKey::Field(index) => object.values_mut().get_mut(*index),
                SlotKey::Entry(_) => None,
            },
            Self::Generic(element) => match key {
                SlotKey::Field(index) => element.fields_mut().get_mut(*index),
                SlotKey::Entry(name) => {
                    Some(element.entries_mut().get_or_insert_with(name, Value::default))
                }
            },
            Self::Map(map) => match key {
                SlotKey::Field(_) => None,
                SlotKey::Entry(name) => Some(map.get_or_insert_with(name, Value::default)),
            },
        }
    }

    /// Replace the value of a slot.
    pub fn set(&mut self, key: &SlotKey, value: Value) {
        if let Some(slot) = self.slot_mut(key) {
            *slot = value;
        }
    }

    /// Store a leaf value.
    ///
    /// Fields are replaced. Entries hold the first value as is and turn into a
    /// list when the same name is written again.
    pub fn put_leaf(&mut self, key: &SlotKey, value: Value) {
        match key {
            SlotKey::Field(_) => self.set(key, value),
            SlotKey::Entry(_) => {
                if let Some(slot) = self.slot_mut(key) {
                    match slot {
                        Value::Null => *slot = value,
                        Value::Collection(list) if list.kind() == CollectionKind::List => {
                            list.push(value);
                        }
                        other => {
                            let first = std::mem::take(other);
                            *other = Value::Collection([first, value].into_iter().collect());
                        }
                    }
                }
            }
        }
    }

    /// Append a value to the list bound to a slot, creating the list on
    /// first use. Even a single occurrence is stored as a one-element list.
    pub fn append(&mut self, key: &SlotKey, value: Value) {
        if let Some(slot) = self.slot_mut(key) {
            match slot {
                Value::Collection(list) => {
                    list.push(value);
                }
                Value::Null => *slot = Value::Collection(std::iter::once(value).collect()),
                other => {
                    let first = std::mem::take(other);
                    *other = Value::Collection([first, value].into_iter().collect());
                }
            }
        }
    }

    /// Store a fully parsed nested element.
    ///
    /// Entries and fields of dynamic type accumulate into a list, other fields
    /// are replaced.
    pub fn store_nested(&mut self, key: &SlotKey, value: Value, ty: &Type) {
        match key {
            SlotKey::Entry(_) => self.append(key, value),
            SlotKey::Field(_) if ty.is_dynamic() => self.append(key, value),
            SlotKey::Field(_) => self.set(key, value),
        }
    }

    /// Collection bound to a slot, creating an empty one of `kind` if the slot
    /// does not hold a collection yet.
    pub fn ensure_collection(&mut self, key: &SlotKey, kind: CollectionKind) -> Result<&mut Collection> {
        let slot = self
            .slot_mut(key)
            .ok_or_else(|| Error::InvariantViolation(format!("no slot for {:?}", key)))?;
        if !matches!(slot, Value::Collection(_)) {
            *slot = Value::Collection(Collection::new(kind));
        }
        match slot {
            Value::Collection(collection) => Ok(collection),
            _ => Err(Error::InvariantViolation(format!(
                "slot {:?} does not hold a collection",
                key
            ))),
        }
    }
}

fn variant_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Object(_) => "an object",
        Value::Element(_) => "a generic element",
        Value::Map(_) => "a map",
        Value::Array(_) => "an array",
        Value::Collection(_) => "a collection",
        _ => "a scalar",
    }
}
