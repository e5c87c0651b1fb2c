use std::fmt::{Display, Error, Formatter};

use crate::domain::{Identifier, LentoError};

/// An absolute dotted module name. Always non-empty and every segment is a
/// validated identifier. Relative references live in [`ModulePath`]; by the
/// time a `ModuleName` exists, any relative levels have been resolved away.
///
/// [`ModulePath`]: crate::domain::ModulePath
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleName(Vec<Identifier>);

impl ModuleName {
    pub fn new(segments: Vec<Identifier>) -> Self {
        assert!(!segments.is_empty());
        Self(segments)
    }

    pub fn from_dotted(name: &str) -> Result<Self, LentoError> {
        let segments = name
            .split('.')
            .map(Identifier::new)
            .collect::<Result<Vec<_>, _>>()?;

        if segments.is_empty() {
            return Err(LentoError::InvalidIdentifier(name.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn as_str(&self) -> String {
        self.0
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn segments(&self) -> &[Identifier] {
        &self.0
    }

    /// The top-level package segment, eg `importlib` from `importlib.util`.
    pub fn head(&self) -> &Identifier {
        self.0.first().expect("ModuleName is never empty")
    }

    /// The final segment, eg `util` from `importlib.util`.
    pub fn tail(&self) -> &Identifier {
        self.0.last().expect("ModuleName is never empty")
    }

    pub fn is_top_level(&self) -> bool {
        self.0.len() == 1
    }

    pub fn parent(&self) -> Option<ModuleName> {
        self.strip_last(1)
    }

    /// Removes `n` segments from the end. Walking upward in the module
    /// hierarchy is structural here; relative-import dot handling is layered
    /// on top by the resolve primitive.
    pub fn strip_last(&self, n: usize) -> Option<ModuleName> {
        if n >= self.0.len() {
            return None;
        }
        Some(ModuleName(self.0[..self.0.len() - n].to_vec()))
    }

    pub fn join<I>(&self, tail: I) -> ModuleName
    where
        I: IntoIterator<Item = Identifier>,
    {
        let mut segments = self.0.clone();
        segments.extend(tail);
        ModuleName(segments)
    }

    /// Iterate from the top-level package down to the full name, inclusive.
    ///
    /// Example: "a.b.c" yields ["a", "a.b", "a.b.c"]
    pub fn lineage(&self) -> impl Iterator<Item = ModuleName> + '_ {
        (1..=self.0.len()).map(move |n| ModuleName(self.0[..n].to_vec()))
    }
}

impl Display for ModuleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.as_str())
    }
}

impl From<Identifier> for ModuleName {
    fn from(value: Identifier) -> Self {
        Self(vec![value])
    }
}
