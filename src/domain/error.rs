use thiserror::Error;

use crate::{capture::CaptureError, resolve::ResolveError};

pub type LentoResult<T> = Result<T, LentoError>;

/// Crate-wide error taxonomy.
///
/// Declaration errors (`InvalidIdentifier`, `DuplicateName`,
/// `UnnamedRelativeImport`, `MissingNamespace`) surface at construction or
/// name-map build time. `UnknownAttribute` surfaces on proxy access.
/// Everything raised by the resolve primitive arrives wrapped in `Resolve`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LentoError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("'{0}' used for multiple imports")]
    DuplicateName(String),

    #[error("relative import '{0}' is not allowed without an assigned name")]
    UnnamedRelativeImport(String),

    #[error("attempted to set up a relative import without providing a namespace")]
    MissingNamespace,

    #[error("no lazy attribute named '{0}'")]
    UnknownAttribute(String),

    #[error("module '{module}' has no attribute '{attribute}'")]
    MissingAttribute { module: String, attribute: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl LentoError {
    /// The "target does not exist" failure class. This is the only condition
    /// the try/except and fallback import variants are allowed to recover
    /// from; any other failure must propagate unchanged.
    pub fn is_target_absent(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute { .. } | Self::Resolve(ResolveError::ModuleNotFound(_))
        )
    }

    pub(crate) fn missing_attribute(module: impl ToString, attribute: impl ToString) -> Self {
        Self::MissingAttribute {
            module: module.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_absent_covers_missing_modules_and_attributes() {
        assert!(LentoError::Resolve(ResolveError::ModuleNotFound("m".into())).is_target_absent());
        assert!(LentoError::missing_attribute("m", "attr").is_target_absent());
    }

    #[test]
    fn execution_failures_are_not_target_absent() {
        let err = LentoError::Resolve(ResolveError::Execution {
            module: "m".into(),
            message: "boom".into(),
        });

        assert!(!err.is_target_absent());
        assert!(!LentoError::UnknownAttribute("x".into()).is_target_absent());
    }
}
