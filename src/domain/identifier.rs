use std::{
    borrow::Borrow,
    fmt::{Display, Error, Formatter},
};

use crate::domain::LentoError;

/// A validated binding name: one segment of a module path, an attribute
/// name, or an exposed name. Validation happens at construction so a
/// malformed name surfaces at the declaration site, never mid-resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: &str) -> Result<Self, LentoError> {
        if Self::is_valid(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(LentoError::InvalidIdentifier(name.to_string()))
        }
    }

    fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Lets `IndexMap<Identifier, _>` be queried with a plain `&str`.
impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.0)
    }
}

impl From<&Identifier> for String {
    fn from(value: &Identifier) -> Self {
        value.0.clone()
    }
}
