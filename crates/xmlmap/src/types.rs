//! Type descriptors and the registered schema of bindable classes.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::value::{ArrayMap, Collection, GenericXml, Object, Value};

/// Scalar leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Boolean (`true`, `false`, `1`, `0`).
    Bool,
    /// A single Unicode character.
    Char,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Text.
    String,
}

impl ScalarType {
    /// Get the string name for this scalar type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::String => "String",
        }
    }

    /// Check if this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime kind of a growable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered, keeps duplicates.
    List,
    /// Insertion ordered, drops duplicates.
    Set,
}

impl CollectionKind {
    /// Get the string name for this collection kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Set => "Set",
        }
    }
}

/// A named enum with a closed set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    name: String,
    variants: Vec<String>,
}

impl EnumInfo {
    /// Create an enum descriptor.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        })
    }

    /// Enum name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared values, in declaration order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Check if `value` names one of the declared values.
    pub fn contains(&self, value: &str) -> bool {
        self.variants.iter().any(|v| v == value)
    }
}

/// A declared field of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Composed slot name: `name`, `@name` for attributes, `alias:name` for
    /// namespaced names, `text()` for character data.
    pub name: String,
    /// Declared type, possibly generic.
    pub ty: Type,
}

/// Schema of a bindable class.
///
/// Classes are registered once and shared through `Arc`. Field order is the
/// order of declaration and determines the layout of [`Object`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    name: String,
    type_params: Vec<String>,
    fields: Vec<FieldInfo>,
    ignore_case: bool,
    index: HashMap<String, usize>,
}

impl ClassInfo {
    /// Start building a class schema.
    pub fn builder(name: impl Into<String>) -> ClassInfoBuilder {
        ClassInfoBuilder {
            name: name.into(),
            type_params: Vec::new(),
            fields: Vec::new(),
            ignore_case: false,
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type parameters.
    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    /// Position of the type parameter called `name`.
    pub fn type_param_index(&self, name: &str) -> Option<usize> {
        self.type_params.iter().position(|p| p == name)
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Whether field lookup ignores ASCII case.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Look up a field by composed slot name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldInfo)> {
        let index = if self.ignore_case {
            *self.index.get(name.to_ascii_lowercase().as_str())?
        } else {
            *self.index.get(name)?
        };
        self.fields.get(index).map(|field| (index, field))
    }

    /// Create an instance with every field set to [`Value::Null`].
    pub fn new_instance(self: &Arc<Self>) -> Object {
        Object::new(Arc::clone(self))
    }
}

/// Builder for [`ClassInfo`].
#[derive(Debug, Clone)]
pub struct ClassInfoBuilder {
    name: String,
    type_params: Vec<String>,
    fields: Vec<FieldInfo>,
    ignore_case: bool,
}

impl ClassInfoBuilder {
    /// Declare a type parameter.
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(FieldInfo {
            name: name.into(),
            ty,
        });
        self
    }

    /// Set whether field lookup ignores ASCII case.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Finish the schema.
    pub fn build(self) -> Arc<ClassInfo> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            let key = if self.ignore_case {
                field.name.to_ascii_lowercase()
            } else {
                field.name.clone()
            };
            // first declaration wins
            index.entry(key).or_insert(i);
        }
        Arc::new(ClassInfo {
            name: self.name,
            type_params: self.type_params,
            fields: self.fields,
            ignore_case: self.ignore_case,
            index,
        })
    }
}

/// Declared type of a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Unknown or untyped. Leaves bind as strings, elements as generic maps.
    Any,
    /// Scalar leaf.
    Scalar(ScalarType),
    /// Enum leaf.
    Enum(Arc<EnumInfo>),
    /// A registered class, raw.
    Class(Arc<ClassInfo>),
    /// A generic class with its type arguments.
    Parameterized {
        class: Arc<ClassInfo>,
        args: Vec<Type>,
    },
    /// String-keyed map with the given value type.
    Map(Box<Type>),
    /// Generic XML element, optionally with declared fields.
    Generic(Option<Arc<ClassInfo>>),
    /// Fixed-length array.
    Array(Box<Type>),
    /// Growable collection.
    Collection(CollectionKind, Box<Type>),
    /// Type variable, resolved through the enclosing type contexts.
    Var(String),
    /// Wildcard with an optional upper bound.
    Wildcard(Option<Box<Type>>),
}

impl Type {
    /// `List<component>`.
    pub fn list(component: Type) -> Self {
        Self::Collection(CollectionKind::List, Box::new(component))
    }

    /// `Set<component>`.
    pub fn set(component: Type) -> Self {
        Self::Collection(CollectionKind::Set, Box::new(component))
    }

    /// `[component]`.
    pub fn array(component: Type) -> Self {
        Self::Array(Box::new(component))
    }

    /// `Map<String, value>`.
    pub fn map(value: Type) -> Self {
        Self::Map(Box::new(value))
    }

    /// Type variable `name`.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// `class<args...>`.
    pub fn parameterized(class: Arc<ClassInfo>, args: Vec<Type>) -> Self {
        Self::Parameterized { class, args }
    }

    /// Check if values of this type are scalar or enum leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Check if this type carries no concrete information.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Any | Self::Var(_) | Self::Wildcard(_))
    }

    /// Check if elements of this type bind into a map or generic element.
    pub fn is_map_like(&self) -> bool {
        self.is_dynamic() || matches!(self, Self::Map(_) | Self::Generic(_))
    }

    /// The class behind a raw or parameterized class type.
    pub fn raw_class(&self) -> Option<&Arc<ClassInfo>> {
        match self {
            Self::Class(class) | Self::Parameterized { class, .. } => Some(class),
            Self::Generic(class) => class.as_ref(),
            _ => None,
        }
    }

    /// Component type of an array or collection.
    pub fn component(&self) -> Option<&Type> {
        match self {
            Self::Array(component) | Self::Collection(_, component) => Some(component),
            _ => None,
        }
    }

    /// Value type of a map, `Any` for other map-like types.
    pub fn map_value(&self) -> Type {
        match self {
            Self::Map(value) => (**value).clone(),
            _ => Self::Any,
        }
    }

    /// Create a fresh, empty instance of this type.
    ///
    /// Classes produce an [`Object`] with all fields null, map-like types an
    /// empty map or generic element, collections an empty collection of the
    /// declared kind and arrays an empty array. Leaves have no instance.
    pub fn new_instance(&self) -> Option<Value> {
        match self {
            Self::Class(class) | Self::Parameterized { class, .. } => {
                Some(Value::Object(class.new_instance()))
            }
            Self::Generic(class) => Some(Value::Element(GenericXml::with_class(class.clone()))),
            Self::Map(_) | Self::Any | Self::Var(_) | Self::Wildcard(_) => {
                Some(Value::Map(ArrayMap::new()))
            }
            Self::Collection(kind, _) => Some(Value::Collection(Collection::new(*kind))),
            Self::Array(_) => Some(Value::Array(Vec::new().into_boxed_slice())),
            Self::Scalar(_) | Self::Enum(_) => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Scalar(scalar) => write!(f, "{}", scalar),
            Self::Enum(info) => f.write_str(info.name()),
            Self::Class(class) => f.write_str(class.name()),
            Self::Parameterized { class, args } => {
                write!(f, "{}<", class.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            Self::Map(value) => write!(f, "Map<String, {}>", value),
            Self::Generic(Some(class)) => write!(f, "GenericXml<{}>", class.name()),
            Self::Generic(None) => f.write_str("GenericXml"),
            Self::Array(component) => write!(f, "[{}]", component),
            Self::Collection(kind, component) => write!(f, "{}<{}>", kind.as_str(), component),
            Self::Var(name) => f.write_str(name),
            Self::Wildcard(Some(upper)) => write!(f, "? extends {}", upper),
            Self::Wildcard(None) => f.write_str("?"),
        }
    }
}
