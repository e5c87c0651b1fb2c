mod grouper;
mod spec;

pub use grouper::group_specs;
pub use spec::{
    FromImport, ImportSpec, ModuleImport, MultiFromImport, SubmoduleGroup, TryExceptFromImport,
    TryExceptImport, TryFallbackImport,
};
