pub mod state;

pub use state::{force_imports, importer_state, module_funcs, ImporterState};

use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    domain::{Bindings, Identifier, LentoError, LentoResult, Namespace, Value},
    imports::{group_specs, ImportSpec},
    resolve::Resolver,
};

/// Process-wide eager-mode defaults. The host sources these once at start
/// (eg from its environment) and passes them in; they are never read as
/// ambient state inside resolution logic. Per-instance overrides in
/// [`ImporterOptions`] always win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EagerDefaults {
    pub process: bool,
    pub import: bool,
}

/// Construction options for [`LazyImporter`].
#[derive(Debug, Clone, Default)]
pub struct ImporterOptions {
    /// Required whenever any spec uses a relative module path.
    pub namespace: Option<Namespace>,
    /// Build the name map at construction, surfacing duplicate-name errors
    /// immediately instead of at first access.
    pub eager_process: Option<bool>,
    /// Resolve every spec at construction, fully defeating laziness. Used
    /// for diagnostics and parity testing. Implies `eager_process`.
    pub eager_import: Option<bool>,
    pub defaults: EagerDefaults,
}

/// Grouped specs plus the mapping from exposed name to owning spec.
struct NameMap {
    specs: Vec<ImportSpec>,
    by_name: IndexMap<Identifier, usize>,
}

/// The resolution proxy: a static, declarative list of imports whose
/// resolution is deferred until a name is first requested.
///
/// Resolved values accumulate for the lifetime of the proxy and are never
/// evicted or overwritten; a spec that exposes several names resolves all
/// of them together, so the resolve primitive fires at most once per spec.
pub struct LazyImporter {
    resolver: Resolver,
    namespace: Option<Namespace>,
    imports: Vec<ImportSpec>,
    name_map: RefCell<Option<Rc<NameMap>>>,
    resolved: RefCell<Bindings>,
}

impl LazyImporter {
    /// A fully lazy importer: nothing is validated against other specs or
    /// resolved until first access.
    pub fn new(resolver: Resolver, imports: Vec<ImportSpec>) -> Self {
        Self {
            resolver,
            namespace: None,
            imports,
            name_map: RefCell::new(None),
            resolved: RefCell::new(Bindings::new()),
        }
    }

    pub fn with_options(
        resolver: Resolver,
        imports: Vec<ImportSpec>,
        options: ImporterOptions,
    ) -> LentoResult<Self> {
        let mut importer = Self::new(resolver, imports);
        importer.namespace = options.namespace;

        let eager_import = options.eager_import.unwrap_or(options.defaults.import);
        let eager_process =
            eager_import || options.eager_process.unwrap_or(options.defaults.process);

        if eager_process {
            importer.processed()?;
        }
        if eager_import {
            state::force_imports(&importer)?;
        }
        Ok(importer)
    }

    /// The raw spec list as declared, before grouping.
    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    /// Return the value for `name`, resolving its owning spec on first
    /// access. Every name the spec produces is cached in the same step, so
    /// sibling names of a multi-name spec appear resolved afterwards.
    pub fn get(&self, name: &str) -> LentoResult<Value> {
        if let Some(value) = self.resolved.borrow().get(name) {
            trace!(name, "cache hit");
            return Ok(value.clone());
        }

        let map = self.processed()?;
        let Some(&index) = map.by_name.get(name) else {
            return Err(LentoError::UnknownAttribute(name.to_string()));
        };

        debug!(name, "first access, resolving owning spec");
        // No borrows are held across this call; resolution may block or
        // re-enter the resolver freely.
        let bindings = map.specs[index].resolve(&self.resolver, self.namespace.as_ref())?;

        let mut resolved = self.resolved.borrow_mut();
        for (key, value) in bindings {
            // Append-only: an existing entry is never overwritten.
            resolved.entry(key).or_insert(value);
        }

        resolved
            .get(name)
            .cloned()
            .ok_or_else(|| LentoError::UnknownAttribute(name.to_string()))
    }

    /// Every exposed name across all specs, sorted. Stable regardless of
    /// resolution state.
    pub fn possible_names(&self) -> LentoResult<Vec<String>> {
        let map = self.processed()?;
        let mut names: Vec<String> = map.by_name.keys().map(String::from).collect();
        names.sort();
        Ok(names)
    }

    pub(crate) fn resolved_bindings(&self) -> Bindings {
        self.resolved.borrow().clone()
    }

    /// Group the raw specs and build the name map, validating that no two
    /// specs expose the same name and that relative specs have a namespace.
    /// Built once; subsequent calls return the cached map.
    fn processed(&self) -> LentoResult<Rc<NameMap>> {
        if let Some(map) = self.name_map.borrow().as_ref() {
            return Ok(map.clone());
        }

        let specs = group_specs(self.imports.clone());
        let mut by_name = IndexMap::new();
        for (index, spec) in specs.iter().enumerate() {
            if spec.is_relative() && self.namespace.is_none() {
                return Err(LentoError::MissingNamespace);
            }
            for name in spec.exposed_names() {
                if by_name.insert(name.clone(), index).is_some() {
                    return Err(LentoError::DuplicateName(name.to_string()));
                }
            }
        }

        let map = Rc::new(NameMap { specs, by_name });
        *self.name_map.borrow_mut() = Some(map.clone());
        Ok(map)
    }
}

impl fmt::Debug for LazyImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyImporter")
            .field("imports", &self.imports)
            .field("resolved", &self.resolved.borrow())
            .finish_non_exhaustive()
    }
}
