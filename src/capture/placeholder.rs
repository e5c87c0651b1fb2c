use std::{
    fmt::{Display, Error, Formatter},
    rc::Rc,
};

/// A non-resolving stand-in returned by the capture interceptor.
///
/// Represents an access path rooted at an exposed name, growing one
/// attribute at a time: `a`, then `a.b`, then `a.b.c`. Attribute access
/// never fails and never performs real resolution, so captured code can
/// walk arbitrarily deep chains on values that were never imported.
/// Equality is by value over the whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder(Rc<Node>);

#[derive(Debug, PartialEq, Eq)]
struct Node {
    name: String,
    parent: Option<Placeholder>,
}

impl Placeholder {
    pub fn root(name: &str) -> Self {
        Self(Rc::new(Node {
            name: name.to_string(),
            parent: None,
        }))
    }

    /// A child placeholder one attribute deeper.
    pub fn attr(&self, name: &str) -> Self {
        Self(Rc::new(Node {
            name: name.to_string(),
            parent: Some(self.clone()),
        }))
    }

    /// This node's own segment.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Placeholder> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The exposed name this chain is rooted at.
    pub fn root_name(&self) -> &str {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node.name()
    }

    /// The full dotted access path from the root.
    pub fn path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}.{}", parent.path(), self.name()),
            None => self.name().to_string(),
        }
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.path())
    }
}
