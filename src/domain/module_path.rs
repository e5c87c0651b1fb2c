use std::fmt::{Display, Error, Formatter};

use crate::domain::{Identifier, LentoError, ModuleName};

/// A module reference as written at a declaration site: zero or more leading
/// dots (the relative nesting level) followed by a dotted name.
///
/// The name part may be empty only for a relative reference, mirroring
/// `from . import x`. Absolute references always carry at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath {
    level: usize,
    segments: Vec<Identifier>,
}

impl ModulePath {
    /// Parse a reference such as `"importlib.util"` or `"..sibling.mod"`.
    pub fn parse(reference: &str) -> Result<Self, LentoError> {
        let level = reference.chars().take_while(|c| *c == '.').count();
        let rest = &reference[level..];

        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('.')
                .map(Identifier::new)
                .collect::<Result<Vec<_>, _>>()?
        };

        if level == 0 && segments.is_empty() {
            return Err(LentoError::InvalidIdentifier(reference.to_string()));
        }

        Ok(Self { level, segments })
    }

    pub fn absolute(name: ModuleName) -> Self {
        Self {
            level: 0,
            segments: name.segments().to_vec(),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    pub fn segments(&self) -> &[Identifier] {
        &self.segments
    }

    pub fn head(&self) -> Option<&Identifier> {
        self.segments.first()
    }

    /// The dotted name without any relative prefix, if one exists.
    pub fn name(&self) -> Option<ModuleName> {
        if self.segments.is_empty() {
            None
        } else {
            Some(ModuleName::new(self.segments.clone()))
        }
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        for _ in 0..self.level {
            write!(f, ".")?;
        }
        let dotted = self
            .segments
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{dotted}")
    }
}
