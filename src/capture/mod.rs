mod captured;
mod placeholder;

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    domain::{Identifier, LentoResult, ModulePath, Namespace, Value},
    imports::{ImportSpec, ModuleImport, MultiFromImport},
    resolve::{ResolveError, ResolvePrimitive, Resolver},
};

pub use captured::{CapturedFromImport, CapturedImport, CapturedModuleImport};
pub use placeholder::Placeholder;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("the resolve primitive was replaced while a capture session was active")]
    ReplacedWhileActive,
}

/// The substituted primitive: records what each resolution request would
/// have imported and hands back a placeholder instead of resolving.
struct CapturingResolver {
    captured: Rc<RefCell<Vec<CapturedImport>>>,
}

impl ResolvePrimitive for CapturingResolver {
    fn resolve(
        &self,
        path: &ModulePath,
        _namespace: Option<&Namespace>,
        fromlist: &[Identifier],
    ) -> Result<Value, ResolveError> {
        // The placeholder is rooted at the name the surrounding code will
        // bind: the top-level segment of the path.
        let root_name = path
            .head()
            .map(|segment| segment.as_str().to_string())
            .unwrap_or_else(|| path.to_string());
        let placeholder = Placeholder::root(&root_name);

        let mut captured = self.captured.borrow_mut();
        if fromlist.is_empty() {
            debug!(module = %path, "captured module import");
            captured.push(CapturedImport::Module(CapturedModuleImport {
                module_name: path.clone(),
                placeholder: placeholder.clone(),
            }));
        } else {
            for attribute in fromlist {
                debug!(module = %path, attribute = %attribute, "captured from-import");
                captured.push(CapturedImport::From(CapturedFromImport {
                    module_name: path.clone(),
                    attrib_name: attribute.clone(),
                    placeholder: placeholder.clone(),
                }));
            }
        }

        Ok(Value::Placeholder(placeholder))
    }
}

/// A scoped substitution of the resolve primitive.
///
/// While a session is active, resolution requests through the shared
/// [`Resolver`] are recorded instead of executed, and placeholders stand in
/// for the values real resolution would have produced. The previous
/// primitive is restored when the session is finished *or* dropped, so no
/// exit path leaves the interceptor installed.
pub struct CaptureSession {
    resolver: Resolver,
    previous: Option<Rc<dyn ResolvePrimitive>>,
    interceptor: Rc<dyn ResolvePrimitive>,
    captured: Rc<RefCell<Vec<CapturedImport>>>,
}

impl CaptureSession {
    pub fn begin(resolver: &Resolver) -> Self {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let interceptor: Rc<dyn ResolvePrimitive> = Rc::new(CapturingResolver {
            captured: captured.clone(),
        });
        let previous = resolver.swap(interceptor.clone());
        debug!("capture session started");

        Self {
            resolver: resolver.clone(),
            previous: Some(previous),
            interceptor,
            captured,
        }
    }

    /// The entries recorded so far, in observation order.
    pub fn captured(&self) -> Vec<CapturedImport> {
        self.captured.borrow().clone()
    }

    /// Restore the previous primitive and reconstruct specs equivalent to
    /// the captured imports: module entries become [`ModuleImport`]s (a
    /// dotted path is renamed to its final element, mirroring
    /// `import a.b as b`), and from-entries group per module into
    /// [`MultiFromImport`]s. Value-equal duplicates collapse.
    pub fn finish(mut self) -> LentoResult<Vec<ImportSpec>> {
        let clean = self.restore();

        let entries = self.captured.borrow();
        let mut deduped: Vec<&CapturedImport> = Vec::new();
        for entry in entries.iter() {
            if !deduped.contains(&entry) {
                deduped.push(entry);
            }
        }

        let mut specs: Vec<ImportSpec> = Vec::new();
        let mut from_groups: IndexMap<String, (ModulePath, Vec<(Identifier, Identifier)>)> =
            IndexMap::new();

        for entry in deduped {
            match entry {
                CapturedImport::Module(module) => {
                    let needs_rename = module.module_name.segments().len() > 1
                        || module.module_name.is_relative();
                    let asname = if needs_rename {
                        module.final_element().cloned()
                    } else {
                        None
                    };
                    specs.push(ImportSpec::Module(ModuleImport::from_parts(
                        module.module_name.clone(),
                        asname,
                    )?));
                }
                CapturedImport::From(from) => {
                    let (_, pairs) = from_groups
                        .entry(from.module_name.to_string())
                        .or_insert_with(|| (from.module_name.clone(), Vec::new()));
                    pairs.push((from.attrib_name.clone(), from.attrib_name.clone()));
                }
            }
        }

        for (_, (path, pairs)) in from_groups {
            specs.push(ImportSpec::MultiFrom(MultiFromImport::from_parts(
                path, pairs,
            )));
        }

        if !clean {
            return Err(CaptureError::ReplacedWhileActive.into());
        }
        Ok(specs)
    }

    /// Swap the previous primitive back in. Returns whether the slot still
    /// held this session's interceptor.
    fn restore(&mut self) -> bool {
        let Some(previous) = self.previous.take() else {
            return true;
        };

        let clean = Rc::ptr_eq(&self.resolver.current(), &self.interceptor);
        self.resolver.swap(previous);
        if clean {
            debug!("capture session ended, primitive restored");
        } else {
            warn!("resolve primitive was replaced inside a capture scope; restoring the original");
        }
        clean
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        domain::test_utils::{int, module_path},
        importer::LazyImporter,
        resolve::ModuleRegistry,
    };

    fn identifier(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    fn resolver() -> Resolver {
        let mut registry = ModuleRegistry::new();
        registry.define("pkg").unwrap();
        registry
            .define_with("pkg.sub", [("attr", int!(10)), ("other", int!(11))])
            .unwrap();
        Resolver::new(registry)
    }

    #[test]
    fn module_import_is_recorded_and_chains_stay_captured() {
        let resolver = resolver();
        let session = CaptureSession::begin(&resolver);

        let value = resolver.resolve(&module_path!("m"), None, &[]).unwrap();
        // Attribute chains on the stand-in never fail and never resolve.
        let deep = value
            .get_member("attr")
            .and_then(|v| v.get_member("deep"))
            .unwrap();
        assert!(deep.is_placeholder());

        let captured = session.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(
            captured[0],
            CapturedImport::Module(CapturedModuleImport {
                module_name: module_path!("m"),
                placeholder: Placeholder::root("m"),
            })
        );
    }

    #[test]
    fn from_import_records_one_entry_per_attribute() {
        let resolver = resolver();
        let session = CaptureSession::begin(&resolver);

        resolver
            .resolve(
                &module_path!("pkg.sub"),
                None,
                &[identifier("attr"), identifier("other")],
            )
            .unwrap();

        let captured = session.captured();
        assert_eq!(captured.len(), 2);
        assert!(captured.iter().all(|entry| matches!(entry, CapturedImport::From(_))));
    }

    #[test]
    fn finish_reconstructs_equivalent_specs() {
        let resolver = resolver();
        let session = CaptureSession::begin(&resolver);

        resolver.resolve(&module_path!("pkg"), None, &[]).unwrap();
        resolver.resolve(&module_path!("pkg.sub"), None, &[]).unwrap();
        resolver
            .resolve(
                &module_path!("pkg.sub"),
                None,
                &[identifier("attr"), identifier("other")],
            )
            .unwrap();

        let specs = session.finish().unwrap();

        assert_eq!(
            specs,
            vec![
                ModuleImport::new("pkg").unwrap().into(),
                ModuleImport::with_asname("pkg.sub", "sub").unwrap().into(),
                MultiFromImport::new("pkg.sub", &[("attr", None), ("other", None)])
                    .unwrap()
                    .into(),
            ]
        );
    }

    #[test]
    fn duplicate_captures_collapse() {
        let resolver = resolver();
        let session = CaptureSession::begin(&resolver);

        resolver.resolve(&module_path!("pkg"), None, &[]).unwrap();
        resolver.resolve(&module_path!("pkg"), None, &[]).unwrap();

        let specs = session.finish().unwrap();
        assert_eq!(specs, vec![ModuleImport::new("pkg").unwrap().into()]);
    }

    #[test]
    fn captured_specs_resolve_for_real_afterwards() {
        let resolver = resolver();

        let session = CaptureSession::begin(&resolver);
        resolver
            .resolve(&module_path!("pkg.sub"), None, &[identifier("attr")])
            .unwrap();
        let specs = session.finish().unwrap();

        // The interceptor is gone; the same resolver now resolves for real.
        let importer = LazyImporter::new(resolver, specs);
        assert_eq!(importer.get("attr").unwrap(), int!(10));
    }

    #[test]
    fn drop_restores_the_previous_primitive() {
        let resolver = resolver();

        {
            let _session = CaptureSession::begin(&resolver);
            let value = resolver.resolve(&module_path!("pkg"), None, &[]).unwrap();
            assert!(value.is_placeholder());
        }

        // Scope exited without finish(); real resolution is back.
        let value = resolver.resolve(&module_path!("pkg"), None, &[]).unwrap();
        assert!(value.as_module().is_some());
    }

    #[test]
    fn replaced_primitive_is_reported_but_still_restored() {
        let resolver = resolver();
        let original = resolver.current();

        let session = CaptureSession::begin(&resolver);
        // Someone else swaps the primitive behind the session's back.
        resolver.swap(Rc::new(CapturingResolver {
            captured: Rc::new(RefCell::new(Vec::new())),
        }));

        let err = session.finish().unwrap_err();
        assert_eq!(
            err,
            crate::domain::LentoError::Capture(CaptureError::ReplacedWhileActive)
        );
        assert!(Rc::ptr_eq(&resolver.current(), &original));
    }
}
