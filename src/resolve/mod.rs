mod module;
mod registry;

use std::{fmt, rc::Rc};

use thiserror::Error;

use crate::{
    core::Container,
    domain::{Identifier, ModulePath, Namespace, Value},
};

pub use module::Module;
pub use registry::{ModuleDef, ModuleRegistry};

/// Failures surfaced by a resolve primitive. `ModuleNotFound` is the
/// distinguishable "target absent" class; `Execution` covers any failure
/// raised while running the target's own code and must never be mistaken
/// for absence.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("No module named '{0}'")]
    ModuleNotFound(String),

    #[error("attempted a relative resolution of '{path}' without a namespace package")]
    MissingNamespace { path: String },

    #[error("relative resolution of '{path}' walks beyond the top-level package")]
    BeyondTopLevel { path: String },

    #[error("error while loading module '{module}': {message}")]
    Execution { module: String, message: String },
}

/// The module-loading primitive this crate defers. Implementations load the
/// module named by `path` (resolving relative levels against `namespace`)
/// and return a module-like [`Value`].
///
/// Contract, mirroring host-interpreter import semantics:
/// - empty `fromlist`, absolute path: return the *top-level* module of the
///   dotted path, with every intermediate submodule loaded and attached;
/// - empty `fromlist`, relative path: return the leaf module;
/// - non-empty `fromlist`: return the leaf module, loading any listed
///   attributes that are themselves submodules.
pub trait ResolvePrimitive {
    fn resolve(
        &self,
        path: &ModulePath,
        namespace: Option<&Namespace>,
        fromlist: &[Identifier],
    ) -> Result<Value, ResolveError>;
}

/// A swappable handle around the current resolve primitive.
///
/// Import specs resolve through a `Resolver` rather than a concrete
/// primitive so the capture subsystem can substitute an interceptor for a
/// strictly scoped duration. Clones share the same slot.
#[derive(Clone)]
pub struct Resolver {
    slot: Container<Rc<dyn ResolvePrimitive>>,
}

impl Resolver {
    pub fn new(primitive: impl ResolvePrimitive + 'static) -> Self {
        Self::from_rc(Rc::new(primitive))
    }

    pub fn from_rc(primitive: Rc<dyn ResolvePrimitive>) -> Self {
        Self {
            slot: Container::new(primitive),
        }
    }

    pub fn resolve(
        &self,
        path: &ModulePath,
        namespace: Option<&Namespace>,
        fromlist: &[Identifier],
    ) -> Result<Value, ResolveError> {
        // Clone out of the slot before calling so the primitive may itself
        // touch the resolver without a double borrow.
        let current = self.slot.borrow().clone();
        current.resolve(path, namespace, fromlist)
    }

    /// Install a new primitive, returning the one it displaced.
    pub(crate) fn swap(&self, next: Rc<dyn ResolvePrimitive>) -> Rc<dyn ResolvePrimitive> {
        std::mem::replace(&mut self.slot.borrow_mut(), next)
    }

    pub(crate) fn current(&self) -> Rc<dyn ResolvePrimitive> {
        self.slot.borrow().clone()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}
