use std::fmt::{Display, Error, Formatter};

use indexmap::IndexMap;

use crate::{capture::Placeholder, core::Container, domain::Identifier, resolve::Module};

/// The ordered output of resolving one import spec: exposed name to value.
pub type Bindings = IndexMap<Identifier, Value>;

/// The module-like object universe the resolve primitive produces. Leaf
/// variants exist so module attributes and fallback literals have somewhere
/// to live; `Placeholder` is only ever produced inside a capture scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Module(Container<Module>),
    Placeholder(Placeholder),
}

impl Value {
    /// Attribute read. Modules consult their scope; placeholders always
    /// produce a deeper placeholder; leaves have no members.
    pub fn get_member(&self, name: &str) -> Option<Value> {
        match self {
            Value::Module(module) => module.borrow().get(name),
            Value::Placeholder(placeholder) => Some(Value::Placeholder(placeholder.attr(name))),
            _ => None,
        }
    }

    /// The member names available on this value, for introspection.
    pub fn dir(&self) -> Vec<String> {
        match self {
            Value::Module(module) => module.borrow().symbols(),
            _ => Vec::new(),
        }
    }

    pub fn as_module(&self) -> Option<&Container<Module>> {
        match self {
            Value::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Module(module) => write!(f, "<module '{}'>", module.borrow().name()),
            Value::Placeholder(placeholder) => write!(f, "<placeholder '{}'>", placeholder.path()),
        }
    }
}
