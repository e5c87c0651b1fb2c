use indexmap::IndexMap;

use crate::domain::{ModuleName, Value};

/// A loaded module: a name plus a symbol scope. Submodules appear in the
/// scope of their parent once loaded, so `pkg.sub` is reachable as the
/// `sub` member of `pkg`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    name: ModuleName,
    scope: IndexMap<String, Value>,
}

impl Module {
    pub fn new(name: ModuleName) -> Self {
        Self {
            name,
            scope: IndexMap::new(),
        }
    }

    pub fn with_attrs(name: ModuleName, attrs: IndexMap<String, Value>) -> Self {
        Self { name, scope: attrs }
    }

    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.scope.get(name).cloned()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.scope.insert(name.to_string(), value);
    }

    /// All symbols in this module's scope, in declaration order.
    pub fn symbols(&self) -> Vec<String> {
        self.scope.keys().cloned().collect()
    }
}
