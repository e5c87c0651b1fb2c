use indexmap::IndexMap;

use crate::{
    domain::Identifier,
    imports::{ImportSpec, SubmoduleGroup},
};

/// Collapse overlapping unrenamed module imports.
///
/// `import a` followed by `import a.b` would otherwise resolve `a` twice
/// with inconsistent attribute exposure; the combined behavior is a single
/// [`SubmoduleGroup`] that resolves `a` once, additionally resolves every
/// declared submodule path, and exposes only `a`.
///
/// Order-preserving: each group sits at the position of its first
/// contributing entry, and unrelated specs never move relative to each
/// other. Renamed entries create independent bindings and are never merged.
/// Idempotent: grouping an already-grouped list is a no-op.
pub fn group_specs(specs: Vec<ImportSpec>) -> Vec<ImportSpec> {
    let mut grouped: Vec<ImportSpec> = Vec::with_capacity(specs.len());
    // Base segment -> index of its group in `grouped`.
    let mut groups: IndexMap<Identifier, usize> = IndexMap::new();

    fn merge(
        grouped: &mut Vec<ImportSpec>,
        groups: &mut IndexMap<Identifier, usize>,
        group: SubmoduleGroup,
    ) {
        match groups.get(group.base()) {
            Some(&index) => {
                if let ImportSpec::Submodules(existing) = &mut grouped[index] {
                    for submodule in group.submodules().iter().cloned() {
                        existing.add(submodule);
                    }
                }
            }
            None => {
                groups.insert(group.base().clone(), grouped.len());
                grouped.push(ImportSpec::Submodules(group));
            }
        }
    }

    for spec in specs {
        match spec {
            ImportSpec::Module(module) if module.asname().is_none() => {
                // Relative unrenamed imports are rejected at construction,
                // so a groupable entry always has an absolute path.
                let Some(name) = module.path().name() else {
                    grouped.push(ImportSpec::Module(module));
                    continue;
                };

                let mut group = SubmoduleGroup::new(name.head().clone());
                if !name.is_top_level() {
                    group.add(name);
                }
                merge(&mut grouped, &mut groups, group);
            }
            ImportSpec::Submodules(group) => merge(&mut grouped, &mut groups, group),
            other => grouped.push(other),
        }
    }

    grouped
}
