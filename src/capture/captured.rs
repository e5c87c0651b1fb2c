use crate::{
    capture::Placeholder,
    domain::{Identifier, ModulePath},
};

/// One `import <module>` observed inside a capture scope.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedModuleImport {
    pub module_name: ModulePath,
    pub placeholder: Placeholder,
}

impl CapturedModuleImport {
    /// The final segment of the module path, used as the default binding
    /// name when reconstructing a spec for a dotted path.
    pub fn final_element(&self) -> Option<&Identifier> {
        self.module_name.segments().last()
    }
}

/// One attribute of a `from <module> import ...` observed inside a capture
/// scope. A from-import of several attributes records one entry each, all
/// sharing the placeholder returned for that resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFromImport {
    pub module_name: ModulePath,
    pub attrib_name: Identifier,
    pub placeholder: Placeholder,
}

/// Entries describing the same (module, attribute) pair are equal by value,
/// enabling deduplication by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedImport {
    Module(CapturedModuleImport),
    From(CapturedFromImport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::module_path;

    #[test]
    fn identical_entries_are_equal_by_value() {
        let a = CapturedImport::From(CapturedFromImport {
            module_name: module_path!("pkg.sub"),
            attrib_name: Identifier::new("attr").unwrap(),
            placeholder: Placeholder::root("pkg"),
        });
        let b = CapturedImport::From(CapturedFromImport {
            module_name: module_path!("pkg.sub"),
            attrib_name: Identifier::new("attr").unwrap(),
            placeholder: Placeholder::root("pkg"),
        });

        assert_eq!(a, b);
    }

    #[test]
    fn final_element_of_dotted_path() {
        let entry = CapturedModuleImport {
            module_name: module_path!("pkg.sub"),
            placeholder: Placeholder::root("pkg"),
        };

        assert_eq!(entry.final_element().unwrap().as_str(), "sub");
    }
}
