//! Deferred import resolution: declare imports up front, resolve each one
//! on first access, and cache the result.
//!
//! The building blocks are [`ImportSpec`] (what to import and under which
//! name), [`LazyImporter`] (the access point that resolves on demand), and
//! [`Resolver`] (the swappable primitive that performs real resolution).
//! [`CaptureSession`] substitutes the primitive temporarily so import
//! requests can be recorded instead of executed.

pub mod capture;
pub mod core;
pub mod domain;
pub mod importer;
pub mod imports;
pub mod resolve;

pub use capture::{CaptureError, CaptureSession, Placeholder};
pub use domain::{Bindings, Identifier, LentoError, LentoResult, ModuleName, ModulePath, Namespace, Value};
pub use importer::{
    force_imports, importer_state, module_funcs, EagerDefaults, ImporterOptions, ImporterState,
    LazyImporter,
};
pub use imports::{
    group_specs, FromImport, ImportSpec, ModuleImport, MultiFromImport, SubmoduleGroup,
    TryExceptFromImport, TryExceptImport, TryFallbackImport,
};
pub use resolve::{Module, ModuleRegistry, ResolveError, ResolvePrimitive, Resolver};
