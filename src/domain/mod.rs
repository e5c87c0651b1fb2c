mod error;
mod identifier;
mod module_name;
mod module_path;
mod namespace;
#[cfg(test)]
pub mod test_utils;
mod value;

pub use error::{LentoError, LentoResult};
pub use identifier::Identifier;
pub use module_name::ModuleName;
pub use module_path::ModulePath;
pub use namespace::Namespace;
pub use value::{Bindings, Value};
