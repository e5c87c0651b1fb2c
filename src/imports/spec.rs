use indexmap::IndexSet;
use tracing::debug;

use crate::{
    domain::{
        Bindings, Identifier, LentoError, LentoResult, ModuleName, ModulePath, Namespace, Value,
    },
    resolve::{ResolveError, Resolver},
};

/// `import <module> [as <asname>]`.
///
/// Without a rename the top-level segment is exposed and bound to the root
/// module. With a rename the *entire* dotted path is walked and the final
/// module is bound under the rename.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleImport {
    path: ModulePath,
    asname: Option<Identifier>,
}

impl ModuleImport {
    pub fn new(path: &str) -> LentoResult<Self> {
        Self::from_parts(ModulePath::parse(path)?, None)
    }

    pub fn with_asname(path: &str, asname: &str) -> LentoResult<Self> {
        Self::from_parts(ModulePath::parse(path)?, Some(Identifier::new(asname)?))
    }

    pub(crate) fn from_parts(path: ModulePath, asname: Option<Identifier>) -> LentoResult<Self> {
        if path.head().is_none() {
            return Err(LentoError::InvalidIdentifier(path.to_string()));
        }
        // A relative module import has no meaningful top-level segment to
        // expose, so a rename is mandatory.
        if path.is_relative() && asname.is_none() {
            return Err(LentoError::UnnamedRelativeImport(path.to_string()));
        }
        Ok(Self { path, asname })
    }

    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn asname(&self) -> Option<&Identifier> {
        self.asname.as_ref()
    }

    fn head(&self) -> &Identifier {
        self.path.head().expect("checked at construction")
    }

    fn exposed_name(&self) -> Identifier {
        self.asname.clone().unwrap_or_else(|| self.head().clone())
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let value = match &self.asname {
            Some(_) => import_named_module(&self.path, resolver, namespace)?,
            None => resolver.resolve(&self.path, namespace, &[])?,
        };

        Ok(Bindings::from_iter([(self.exposed_name(), value)]))
    }
}

/// `from <module> import <attribute> [as <asname>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FromImport {
    path: ModulePath,
    attribute: Identifier,
    asname: Identifier,
}

impl FromImport {
    pub fn new(path: &str, attribute: &str) -> LentoResult<Self> {
        let attribute = Identifier::new(attribute)?;
        let asname = attribute.clone();
        Ok(Self {
            path: ModulePath::parse(path)?,
            attribute,
            asname,
        })
    }

    pub fn with_asname(path: &str, attribute: &str, asname: &str) -> LentoResult<Self> {
        Ok(Self {
            path: ModulePath::parse(path)?,
            attribute: Identifier::new(attribute)?,
            asname: Identifier::new(asname)?,
        })
    }

    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn asname(&self) -> &Identifier {
        &self.asname
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let value = import_attribute(&self.path, &self.attribute, resolver, namespace)?;
        Ok(Bindings::from_iter([(self.asname.clone(), value)]))
    }
}

/// `from <module> import <a>, <b> [as <c>], ...` — one shared module
/// resolution; all names materialize together or none do.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiFromImport {
    path: ModulePath,
    attributes: Vec<(Identifier, Identifier)>,
}

impl MultiFromImport {
    /// `attributes` pairs each attribute with an optional rename.
    pub fn new(path: &str, attributes: &[(&str, Option<&str>)]) -> LentoResult<Self> {
        let attributes = attributes
            .iter()
            .map(|(attribute, asname)| {
                let attribute = Identifier::new(attribute)?;
                let asname = match asname {
                    Some(asname) => Identifier::new(asname)?,
                    None => attribute.clone(),
                };
                Ok((attribute, asname))
            })
            .collect::<LentoResult<Vec<_>>>()?;

        Ok(Self {
            path: ModulePath::parse(path)?,
            attributes,
        })
    }

    pub(crate) fn from_parts(
        path: ModulePath,
        attributes: Vec<(Identifier, Identifier)>,
    ) -> Self {
        Self { path, attributes }
    }

    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn asnames(&self) -> Vec<Identifier> {
        self.attributes
            .iter()
            .map(|(_, asname)| asname.clone())
            .collect()
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let fromlist: Vec<Identifier> = self
            .attributes
            .iter()
            .map(|(attribute, _)| attribute.clone())
            .collect();
        let module = resolver.resolve(&self.path, namespace, &fromlist)?;

        let mut bindings = Bindings::new();
        for (attribute, asname) in &self.attributes {
            let value = module
                .get_member(attribute.as_str())
                .ok_or_else(|| LentoError::missing_attribute(&self.path, attribute))?;
            bindings.insert(asname.clone(), value);
        }
        Ok(bindings)
    }
}

/// `try: import <module> except target-absent: import <except_module>`,
/// bound under one exposed name. Only the "module does not exist" failure
/// class triggers the fallback; an error raised while executing the primary
/// module's own code propagates untouched so real bugs stay visible.
#[derive(Debug, Clone, PartialEq)]
pub struct TryExceptImport {
    path: ModulePath,
    except_path: ModulePath,
    asname: Identifier,
}

impl TryExceptImport {
    pub fn new(path: &str, except_path: &str, asname: &str) -> LentoResult<Self> {
        Ok(Self {
            path: ModulePath::parse(path)?,
            except_path: ModulePath::parse(except_path)?,
            asname: Identifier::new(asname)?,
        })
    }

    pub fn asname(&self) -> &Identifier {
        &self.asname
    }

    fn is_relative(&self) -> bool {
        self.path.is_relative() || self.except_path.is_relative()
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let value = match import_named_module(&self.path, resolver, namespace) {
            Ok(value) => value,
            Err(err) if err.is_target_absent() => {
                debug!(primary = %self.path, fallback = %self.except_path, "primary import absent");
                import_named_module(&self.except_path, resolver, namespace)?
            }
            Err(err) => return Err(err),
        };

        Ok(Bindings::from_iter([(self.asname.clone(), value)]))
    }
}

/// The attribute-level form of [`TryExceptImport`]: a missing primary
/// module *or* a missing primary attribute selects the fallback pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TryExceptFromImport {
    path: ModulePath,
    attribute: Identifier,
    except_path: ModulePath,
    except_attribute: Identifier,
    asname: Identifier,
}

impl TryExceptFromImport {
    pub fn new(
        path: &str,
        attribute: &str,
        except_path: &str,
        except_attribute: &str,
    ) -> LentoResult<Self> {
        let attribute = Identifier::new(attribute)?;
        let asname = attribute.clone();
        Ok(Self {
            path: ModulePath::parse(path)?,
            attribute,
            except_path: ModulePath::parse(except_path)?,
            except_attribute: Identifier::new(except_attribute)?,
            asname,
        })
    }

    pub fn with_asname(
        path: &str,
        attribute: &str,
        except_path: &str,
        except_attribute: &str,
        asname: &str,
    ) -> LentoResult<Self> {
        let mut spec = Self::new(path, attribute, except_path, except_attribute)?;
        spec.asname = Identifier::new(asname)?;
        Ok(spec)
    }

    pub fn asname(&self) -> &Identifier {
        &self.asname
    }

    fn is_relative(&self) -> bool {
        self.path.is_relative() || self.except_path.is_relative()
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let value = match import_attribute(&self.path, &self.attribute, resolver, namespace) {
            Ok(value) => value,
            Err(err) if err.is_target_absent() => {
                debug!(primary = %self.path, fallback = %self.except_path, "primary import absent");
                import_attribute(&self.except_path, &self.except_attribute, resolver, namespace)?
            }
            Err(err) => return Err(err),
        };

        Ok(Bindings::from_iter([(self.asname.clone(), value)]))
    }
}

/// `import <module>` with a literal stand-in if the module does not exist.
/// No second resolution occurs; the caller-supplied value is bound as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct TryFallbackImport {
    path: ModulePath,
    fallback: Value,
    asname: Option<Identifier>,
}

impl TryFallbackImport {
    pub fn new(path: &str, fallback: Value) -> LentoResult<Self> {
        Self::from_parts(ModulePath::parse(path)?, fallback, None)
    }

    pub fn with_asname(path: &str, fallback: Value, asname: &str) -> LentoResult<Self> {
        Self::from_parts(
            ModulePath::parse(path)?,
            fallback,
            Some(Identifier::new(asname)?),
        )
    }

    fn from_parts(
        path: ModulePath,
        fallback: Value,
        asname: Option<Identifier>,
    ) -> LentoResult<Self> {
        if path.head().is_none() {
            return Err(LentoError::InvalidIdentifier(path.to_string()));
        }
        if path.is_relative() && asname.is_none() {
            return Err(LentoError::UnnamedRelativeImport(path.to_string()));
        }
        Ok(Self {
            path,
            fallback,
            asname,
        })
    }

    fn exposed_name(&self) -> Identifier {
        match &self.asname {
            Some(asname) => asname.clone(),
            None => self.path.head().expect("checked at construction").clone(),
        }
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        let attempt = match &self.asname {
            Some(_) => import_named_module(&self.path, resolver, namespace),
            None => resolver
                .resolve(&self.path, namespace, &[])
                .map_err(LentoError::from),
        };

        let value = match attempt {
            Ok(value) => value,
            Err(err) if err.is_target_absent() => {
                debug!(module = %self.path, "module absent, binding fallback value");
                self.fallback.clone()
            }
            Err(err) => return Err(err),
        };

        Ok(Bindings::from_iter([(self.exposed_name(), value)]))
    }
}

/// Grouper output: one top-level module plus every submodule path declared
/// alongside it. Resolving loads each submodule (making nested attributes
/// reachable on the top-level module object) but exposes only the top-level
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmoduleGroup {
    base: Identifier,
    submodules: IndexSet<ModuleName>,
}

impl SubmoduleGroup {
    pub(crate) fn new(base: Identifier) -> Self {
        Self {
            base,
            submodules: IndexSet::new(),
        }
    }

    pub(crate) fn add(&mut self, submodule: ModuleName) {
        self.submodules.insert(submodule);
    }

    pub fn base(&self) -> &Identifier {
        &self.base
    }

    pub fn submodules(&self) -> &IndexSet<ModuleName> {
        &self.submodules
    }

    fn resolve(&self, resolver: &Resolver, namespace: Option<&Namespace>) -> LentoResult<Bindings> {
        for submodule in &self.submodules {
            resolver.resolve(&ModulePath::absolute(submodule.clone()), namespace, &[])?;
        }

        let base_path = ModulePath::absolute(ModuleName::from(self.base.clone()));
        let value = resolver.resolve(&base_path, namespace, &[])?;

        Ok(Bindings::from_iter([(self.base.clone(), value)]))
    }
}

/// The closed set of deferred resolution units. Immutable once constructed;
/// exposed names are computable without performing any resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpec {
    Module(ModuleImport),
    From(FromImport),
    MultiFrom(MultiFromImport),
    TryExcept(TryExceptImport),
    TryExceptFrom(TryExceptFromImport),
    TryFallback(TryFallbackImport),
    Submodules(SubmoduleGroup),
}

impl ImportSpec {
    /// Every name this spec will bind, in declaration order.
    pub fn exposed_names(&self) -> Vec<Identifier> {
        match self {
            Self::Module(spec) => vec![spec.exposed_name()],
            Self::From(spec) => vec![spec.asname.clone()],
            Self::MultiFrom(spec) => spec.asnames(),
            Self::TryExcept(spec) => vec![spec.asname.clone()],
            Self::TryExceptFrom(spec) => vec![spec.asname.clone()],
            Self::TryFallback(spec) => vec![spec.exposed_name()],
            Self::Submodules(group) => vec![group.base.clone()],
        }
    }

    /// Whether this spec requires a namespace to resolve.
    pub fn is_relative(&self) -> bool {
        match self {
            Self::Module(spec) => spec.path.is_relative(),
            Self::From(spec) => spec.path.is_relative(),
            Self::MultiFrom(spec) => spec.path.is_relative(),
            Self::TryExcept(spec) => spec.is_relative(),
            Self::TryExceptFrom(spec) => spec.is_relative(),
            Self::TryFallback(spec) => spec.path.is_relative(),
            Self::Submodules(_) => false,
        }
    }

    /// Perform this spec's imports, producing the full mapping of exposed
    /// names to values. Multi-name specs succeed or fail as a unit.
    pub fn resolve(
        &self,
        resolver: &Resolver,
        namespace: Option<&Namespace>,
    ) -> LentoResult<Bindings> {
        match self {
            Self::Module(spec) => spec.resolve(resolver, namespace),
            Self::From(spec) => spec.resolve(resolver, namespace),
            Self::MultiFrom(spec) => spec.resolve(resolver, namespace),
            Self::TryExcept(spec) => spec.resolve(resolver, namespace),
            Self::TryExceptFrom(spec) => spec.resolve(resolver, namespace),
            Self::TryFallback(spec) => spec.resolve(resolver, namespace),
            Self::Submodules(group) => group.resolve(resolver, namespace),
        }
    }
}

impl From<ModuleImport> for ImportSpec {
    fn from(value: ModuleImport) -> Self {
        Self::Module(value)
    }
}

impl From<FromImport> for ImportSpec {
    fn from(value: FromImport) -> Self {
        Self::From(value)
    }
}

impl From<MultiFromImport> for ImportSpec {
    fn from(value: MultiFromImport) -> Self {
        Self::MultiFrom(value)
    }
}

impl From<TryExceptImport> for ImportSpec {
    fn from(value: TryExceptImport) -> Self {
        Self::TryExcept(value)
    }
}

impl From<TryExceptFromImport> for ImportSpec {
    fn from(value: TryExceptFromImport) -> Self {
        Self::TryExceptFrom(value)
    }
}

impl From<TryFallbackImport> for ImportSpec {
    fn from(value: TryFallbackImport) -> Self {
        Self::TryFallback(value)
    }
}

impl From<SubmoduleGroup> for ImportSpec {
    fn from(value: SubmoduleGroup) -> Self {
        Self::Submodules(value)
    }
}

/// Resolve a dotted path and walk to its final module, mirroring the
/// binding behavior of `import a.b as x`. A missing link in the walk is a
/// missing module, reported with the joined prefix.
fn import_named_module(
    path: &ModulePath,
    resolver: &Resolver,
    namespace: Option<&Namespace>,
) -> LentoResult<Value> {
    let root = resolver.resolve(path, namespace, &[])?;

    // For relative paths the primitive already returns the leaf.
    if path.is_relative() {
        return Ok(root);
    }

    let mut segments = path.segments().iter();
    let Some(first) = segments.next() else {
        return Err(LentoError::InvalidIdentifier(path.to_string()));
    };

    let mut walked = first.as_str().to_string();
    let mut value = root;
    for segment in segments {
        walked.push('.');
        walked.push_str(segment.as_str());
        value = value
            .get_member(segment.as_str())
            .ok_or_else(|| LentoError::Resolve(ResolveError::ModuleNotFound(walked.clone())))?;
    }
    Ok(value)
}

/// Resolve a module and read a single attribute off it.
fn import_attribute(
    path: &ModulePath,
    attribute: &Identifier,
    resolver: &Resolver,
    namespace: Option<&Namespace>,
) -> LentoResult<Value> {
    let module = resolver.resolve(path, namespace, std::slice::from_ref(attribute))?;
    module
        .get_member(attribute.as_str())
        .ok_or_else(|| LentoError::missing_attribute(path, attribute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::test_utils::{int, str_val},
        resolve::ModuleRegistry,
    };

    fn resolver() -> Resolver {
        let mut registry = ModuleRegistry::new();
        registry.define("pkg").unwrap();
        registry
            .define_with("pkg.sub", [("attr", int!(10)), ("other", int!(11))])
            .unwrap();
        registry
            .define_with("tools", [("name", str_val!("tools"))])
            .unwrap();
        registry.define_failing("broken", "exploded on import").unwrap();
        Resolver::new(registry)
    }

    fn names(spec: &ImportSpec) -> Vec<String> {
        spec.exposed_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn exposed_names_without_resolution() {
        let specs: Vec<ImportSpec> = vec![
            ModuleImport::new("pkg.sub").unwrap().into(),
            ModuleImport::with_asname("pkg.sub", "s").unwrap().into(),
            FromImport::new("pkg.sub", "attr").unwrap().into(),
            MultiFromImport::new("pkg.sub", &[("attr", None), ("other", Some("o"))])
                .unwrap()
                .into(),
            TryExceptImport::new("tomllib", "tomli", "tomllib").unwrap().into(),
            TryFallbackImport::new("tools", Value::None).unwrap().into(),
        ];

        let got: Vec<Vec<String>> = specs.iter().map(names).collect();
        let expected: Vec<Vec<String>> = vec![
            vec!["pkg".into()],
            vec!["s".into()],
            vec!["attr".into()],
            vec!["attr".into(), "o".into()],
            vec!["tomllib".into()],
            vec!["tools".into()],
        ];

        assert_eq!(got, expected);
    }

    #[test]
    fn invalid_asname_fails_at_construction() {
        for result in [
            ModuleImport::with_asname("modname", "##invalid_identifier##").map(ImportSpec::from),
            FromImport::with_asname("modname", "attribute", "##invalid_identifier##")
                .map(ImportSpec::from),
            MultiFromImport::new("modname", &[("attribute", Some("##invalid_identifier##"))])
                .map(ImportSpec::from),
            TryExceptImport::new("modname", "altmod", "##invalid_identifier##")
                .map(ImportSpec::from),
        ] {
            assert_eq!(
                result.unwrap_err(),
                LentoError::InvalidIdentifier("##invalid_identifier##".to_string())
            );
        }
    }

    #[test]
    fn relative_module_import_requires_asname() {
        let err = ModuleImport::new(".relative_module").unwrap_err();
        assert_eq!(
            err,
            LentoError::UnnamedRelativeImport(".relative_module".to_string())
        );

        assert!(ModuleImport::with_asname(".relative_module", "relative_module").is_ok());
    }

    #[test]
    fn unrenamed_module_import_binds_the_root() {
        let spec: ImportSpec = ModuleImport::new("pkg.sub").unwrap().into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        let value = bindings.get("pkg").unwrap();
        assert_eq!(value.as_module().unwrap().borrow().name().as_str(), "pkg");
        // The submodule chain was still resolved.
        assert_eq!(
            value.get_member("sub").and_then(|v| v.get_member("attr")),
            Some(int!(10))
        );
    }

    #[test]
    fn renamed_dotted_import_binds_the_leaf() {
        let spec: ImportSpec = ModuleImport::with_asname("pkg.sub", "s").unwrap().into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        let value = bindings.get("s").unwrap();
        assert_eq!(
            value.as_module().unwrap().borrow().name().as_str(),
            "pkg.sub"
        );
    }

    #[test]
    fn renamed_import_of_missing_submodule_names_the_full_prefix() {
        let spec: ImportSpec = ModuleImport::with_asname("pkg.sub.fakemod", "fakemod")
            .unwrap()
            .into();
        let err = spec.resolve(&resolver(), None).unwrap_err();

        assert_eq!(
            err,
            LentoError::Resolve(ResolveError::ModuleNotFound("pkg.sub.fakemod".to_string()))
        );
    }

    #[test]
    fn from_import_reads_one_attribute() {
        let spec: ImportSpec = FromImport::with_asname("pkg.sub", "attr", "a").unwrap().into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        assert_eq!(bindings.get("a"), Some(&int!(10)));
    }

    #[test]
    fn from_import_missing_attribute_is_target_absent() {
        let spec: ImportSpec = FromImport::new("pkg.sub", "nope").unwrap().into();
        let err = spec.resolve(&resolver(), None).unwrap_err();

        assert!(err.is_target_absent());
        assert_eq!(err, LentoError::missing_attribute("pkg.sub", "nope"));
    }

    #[test]
    fn multi_from_import_is_atomic() {
        let spec: ImportSpec =
            MultiFromImport::new("pkg.sub", &[("attr", None), ("other", Some("o"))])
                .unwrap()
                .into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        assert_eq!(bindings.get("attr"), Some(&int!(10)));
        assert_eq!(bindings.get("o"), Some(&int!(11)));
    }

    #[test]
    fn multi_from_import_fails_as_a_unit() {
        let spec: ImportSpec =
            MultiFromImport::new("pkg.sub", &[("attr", None), ("missing", None)])
                .unwrap()
                .into();

        assert!(spec.resolve(&resolver(), None).is_err());
    }

    #[test]
    fn try_except_prefers_the_primary() {
        let spec: ImportSpec = TryExceptImport::new("tools", "pkg.sub", "t").unwrap().into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        let value = bindings.get("t").unwrap();
        assert_eq!(value.as_module().unwrap().borrow().name().as_str(), "tools");
    }

    #[test]
    fn try_except_falls_back_when_primary_absent() {
        let spec: ImportSpec = TryExceptImport::new("tomllib", "tools", "tomllib")
            .unwrap()
            .into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        let value = bindings.get("tomllib").unwrap();
        assert_eq!(value.as_module().unwrap().borrow().name().as_str(), "tools");
    }

    #[test]
    fn try_except_propagates_execution_errors_without_fallback() {
        // "tools" exists, so a fallback here would mask the real failure.
        let spec: ImportSpec = TryExceptImport::new("broken", "tools", "b").unwrap().into();
        let err = spec.resolve(&resolver(), None).unwrap_err();

        assert!(matches!(
            err,
            LentoError::Resolve(ResolveError::Execution { .. })
        ));
    }

    #[test]
    fn try_except_second_failure_propagates() {
        let spec: ImportSpec = TryExceptImport::new("fake1", "fake2", "f").unwrap().into();
        let err = spec.resolve(&resolver(), None).unwrap_err();

        assert_eq!(
            err,
            LentoError::Resolve(ResolveError::ModuleNotFound("fake2".to_string()))
        );
    }

    #[test]
    fn try_except_from_recovers_missing_attribute() {
        let spec: ImportSpec =
            TryExceptFromImport::with_asname("pkg.sub", "missing", "tools", "name", "n")
                .unwrap()
                .into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        assert_eq!(bindings.get("n"), Some(&str_val!("tools")));
    }

    #[test]
    fn try_fallback_binds_the_literal_when_absent() {
        let spec: ImportSpec = TryFallbackImport::new("fakemod", str_val!("stand-in"))
            .unwrap()
            .into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        assert_eq!(bindings.get("fakemod"), Some(&str_val!("stand-in")));
    }

    #[test]
    fn try_fallback_prefers_the_real_module() {
        let spec: ImportSpec = TryFallbackImport::new("tools", Value::None).unwrap().into();
        let bindings = spec.resolve(&resolver(), None).unwrap();

        assert!(bindings.get("tools").unwrap().as_module().is_some());
    }
}
