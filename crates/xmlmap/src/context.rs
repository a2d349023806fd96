//! Stack of enclosing types used to resolve type variables.

use log::trace;

use crate::types::Type;

/// Enclosing types from the document root down to the current slot.
///
/// Every push made while descending into a child element is undone before
/// the descent returns, on success and on error alike. Callers record
/// [`len`](Self::len) before pushing and [`truncate`](Self::truncate) back to it.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    stack: Vec<Type>,
}

impl TypeContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if the context is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Push an enclosing type.
    pub fn push(&mut self, ty: Type) {
        self.stack.push(ty);
    }

    /// Pop the innermost type.
    pub fn pop(&mut self) -> Option<Type> {
        self.stack.pop()
    }

    /// Drop entries until `len` remain.
    pub fn truncate(&mut self, len: usize) {
        self.stack.truncate(len);
    }

    /// Innermost type.
    pub fn top(&self) -> Option<&Type> {
        self.stack.last()
    }

    /// Replace type variables and wildcards in `ty` with the concrete types
    /// they are bound to by the enclosing contexts.
    ///
    /// Variables are looked up from the innermost entry outward. A variable
    /// bound to another variable keeps resolving further out. Anything that
    /// cannot be resolved is returned unchanged.
    pub fn resolve(&self, ty: &Type) -> Type {
        self.resolve_below(ty, self.stack.len())
    }

    fn resolve_below(&self, ty: &Type, end: usize) -> Type {
        match ty {
            Type::Var(name) => self.resolve_var(name, end),
            Type::Wildcard(Some(upper)) => self.resolve_below(upper, end),
            Type::Wildcard(None) => Type::Any,
            Type::Array(component) => Type::Array(Box::new(self.resolve_below(component, end))),
            Type::Collection(kind, component) => {
                Type::Collection(*kind, Box::new(self.resolve_below(component, end)))
            }
            Type::Map(value) => Type::Map(Box::new(self.resolve_below(value, end))),
            Type::Parameterized { class, args } => Type::Parameterized {
                class: class.clone(),
                args: args.iter().map(|arg| self.resolve_below(arg, end)).collect(),
            },
            _ => ty.clone(),
        }
    }

    fn resolve_var(&self, name: &str, end: usize) -> Type {
        for position in (0..end).rev() {
            let Type::Parameterized { class, args } = &self.stack[position] else {
                continue;
            };
            let Some(arg) = class.type_param_index(name).and_then(|i| args.get(i)) else {
                continue;
            };
            trace!("type variable {} bound to {} by {}", name, arg, class.name());
            // bindings made by an entry can only refer to entries further out
            return self.resolve_below(arg, position);
        }
        Type::Var(name.to_owned())
    }
}
