use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    core::Container,
    domain::{Identifier, LentoResult, ModuleName, ModulePath, Namespace, Value},
    resolve::{Module, ResolveError, ResolvePrimitive},
};

/// Definition of a module the registry knows how to load: its attributes,
/// or a simulated failure raised while "executing" its body.
#[derive(Debug, Clone, Default)]
pub struct ModuleDef {
    attrs: IndexMap<String, Value>,
    error: Option<String>,
}

/// An in-memory resolve primitive.
///
/// This mirrors the host-interpreter contract the engine is written
/// against: a definition table standing in for code on disk, a loaded-module
/// cache standing in for `sys.modules`, parent-chain loading with submodule
/// attachment, and relative paths resolved against the namespace's package.
/// It is the reference implementation of [`ResolvePrimitive`] and the
/// workhorse of the test suite.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    defs: IndexMap<ModuleName, ModuleDef>,
    loaded: RefCell<IndexMap<ModuleName, Container<Module>>>,
    load_counts: RefCell<IndexMap<String, usize>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a module with no attributes of its own.
    pub fn define(&mut self, name: &str) -> LentoResult<()> {
        self.define_with(name, std::iter::empty::<(&str, Value)>())
    }

    /// Define a module along with its attributes.
    pub fn define_with<'a, I>(&mut self, name: &str, attrs: I) -> LentoResult<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let name = ModuleName::from_dotted(name)?;
        let attrs = attrs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        self.defs.insert(
            name,
            ModuleDef {
                attrs,
                error: None,
            },
        );
        Ok(())
    }

    /// Define a module whose load fails with an execution error. Used to
    /// model a module that exists but whose body raises.
    pub fn define_failing(&mut self, name: &str, message: &str) -> LentoResult<()> {
        let name = ModuleName::from_dotted(name)?;
        self.defs.insert(
            name,
            ModuleDef {
                attrs: IndexMap::new(),
                error: Some(message.to_string()),
            },
        );
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.load_counts.borrow().contains_key(name)
    }

    /// How many times the named module was actually loaded, as opposed to
    /// served from the loaded-module cache.
    pub fn load_count(&self, name: &str) -> usize {
        self.load_counts.borrow().get(name).copied().unwrap_or(0)
    }

    fn absolutize(&self, path: &ModulePath, namespace: Option<&Namespace>) -> Result<ModuleName, ResolveError> {
        if path.level() == 0 {
            return path
                .name()
                .ok_or_else(|| ResolveError::ModuleNotFound(path.to_string()));
        }

        let package = namespace
            .and_then(Namespace::package)
            .ok_or_else(|| ResolveError::MissingNamespace {
                path: path.to_string(),
            })?;

        // One leading dot refers to the containing package itself, so only
        // `level - 1` segments are stripped before joining the tail.
        let base = package
            .strip_last(path.level() - 1)
            .ok_or_else(|| ResolveError::BeyondTopLevel {
                path: path.to_string(),
            })?;

        Ok(base.join(path.segments().iter().cloned()))
    }

    fn load(&self, name: &ModuleName) -> Result<Container<Module>, ResolveError> {
        if let Some(module) = self.loaded.borrow().get(name) {
            trace!(module = %name, "already loaded");
            return Ok(module.clone());
        }

        let def = self
            .defs
            .get(name)
            .ok_or_else(|| ResolveError::ModuleNotFound(name.as_str()))?;

        if let Some(message) = &def.error {
            return Err(ResolveError::Execution {
                module: name.as_str(),
                message: message.clone(),
            });
        }

        debug!(module = %name, "loading module");
        let module = Container::new(Module::with_attrs(name.clone(), def.attrs.clone()));
        self.loaded
            .borrow_mut()
            .insert(name.clone(), module.clone());
        *self
            .load_counts
            .borrow_mut()
            .entry(name.as_str())
            .or_insert(0) += 1;

        Ok(module)
    }
}

impl ResolvePrimitive for ModuleRegistry {
    fn resolve(
        &self,
        path: &ModulePath,
        namespace: Option<&Namespace>,
        fromlist: &[Identifier],
    ) -> Result<Value, ResolveError> {
        let absolute = self.absolutize(path, namespace)?;
        trace!(module = %absolute, ?fromlist, "resolving");

        // Load the whole parent chain, attaching each submodule to the
        // scope of its parent as the host import machinery guarantees.
        let mut root: Option<Container<Module>> = None;
        let mut leaf: Option<Container<Module>> = None;
        for ancestor in absolute.lineage() {
            let module = self.load(&ancestor)?;
            if let Some(parent) = &leaf {
                parent
                    .borrow_mut()
                    .insert(ancestor.tail().as_str(), Value::Module(module.clone()));
            }
            root.get_or_insert_with(|| module.clone());
            leaf = Some(module);
        }

        let root = root.expect("lineage is never empty");
        let leaf = leaf.expect("lineage is never empty");

        // Attributes in the fromlist that are themselves submodules load as
        // a side effect, matching `from pkg import submod`.
        for attribute in fromlist {
            let child = absolute.join([attribute.clone()]);
            if self.defs.contains_key(&child) {
                let module = self.load(&child)?;
                leaf.borrow_mut()
                    .insert(attribute.as_str(), Value::Module(module));
            }
        }

        if fromlist.is_empty() && path.level() == 0 {
            Ok(Value::Module(root))
        } else {
            Ok(Value::Module(leaf))
        }
    }
}
