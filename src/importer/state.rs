use std::rc::Rc;

use crate::{
    core::Container,
    domain::{Bindings, LentoResult, Value},
    importer::LazyImporter,
    resolve::Module,
};

/// A live view of what an importer has resolved and what is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ImporterState {
    pub resolved: Bindings,
    /// Declared names not yet resolved, sorted.
    pub pending: Vec<String>,
}

/// Inspect an importer without triggering any resolution. Reflects live
/// state: the pending list shrinks as names resolve and never regrows.
pub fn importer_state(importer: &LazyImporter) -> LentoResult<ImporterState> {
    let resolved = importer.resolved_bindings();
    let pending = importer
        .possible_names()?
        .into_iter()
        .filter(|name| !resolved.contains_key(name.as_str()))
        .collect();

    Ok(ImporterState { resolved, pending })
}

/// Resolve every declared name, as if each had been individually requested.
/// Used to materialize an importer fully when laziness must be disabled.
pub fn force_imports(importer: &LazyImporter) -> LentoResult<()> {
    for name in importer.possible_names()? {
        importer.get(&name)?;
    }
    Ok(())
}

pub type GetAttrFn = Box<dyn Fn(&str) -> LentoResult<Value>>;
pub type DirFn = Box<dyn Fn() -> Vec<String>>;

/// Build a dynamic attribute-getter and directory-lister pair for a host
/// scope, so reads of undeclared names on that scope transparently consult
/// the importer.
///
/// With a `module` given, resolved attributes are also written into its
/// scope (subsequent reads bypass the getter entirely) and its static
/// symbols appear in the directory listing alongside the lazy names.
pub fn module_funcs(
    importer: Rc<LazyImporter>,
    module: Option<Container<Module>>,
) -> (GetAttrFn, DirFn) {
    let dir_importer = importer.clone();
    let dir_module = module.clone();

    let getattr: GetAttrFn = Box::new(move |name| {
        let value = importer.get(name)?;
        if let Some(module) = &module {
            module.borrow_mut().insert(name, value.clone());
        }
        Ok(value)
    });

    let dir: DirFn = Box::new(move || {
        let mut names = dir_importer.possible_names().unwrap_or_default();
        if let Some(module) = &dir_module {
            names.extend(module.borrow().symbols());
        }
        names.sort();
        names.dedup();
        names
    });

    (getattr, dir)
}
