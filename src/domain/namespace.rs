use crate::domain::ModuleName;

/// The caller's own scope context. Only required when a declaration uses a
/// relative module path; the resolve primitive combines the relative level
/// with the containing package recorded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    name: ModuleName,
    package: Option<ModuleName>,
}

impl Namespace {
    pub fn new(name: ModuleName, package: Option<ModuleName>) -> Self {
        Self { name, package }
    }

    /// Namespace for a module that lives inside a package, eg a namespace
    /// for `pkg.mod` has package `pkg`.
    pub fn in_package(name: ModuleName) -> Self {
        let package = name.parent();
        Self { name, package }
    }

    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    pub fn package(&self) -> Option<&ModuleName> {
        self.package.as_ref()
    }
}
