//! Import resolution for simple type names.
//!
//! A simple name resolves against single imports first, then against
//! on-demand (wildcard) packages in registration order. The `lang`
//! package is always on demand, so `String` finds `lang.String` out of
//! the box.

use rustc_hash::FxHashMap;

use std::rc::Rc;

use crate::types::{ClassDef, TypeRegistry};

#[derive(Clone, Debug)]
pub struct Imports {
    /// Simple name to fully qualified name.
    single: FxHashMap<String, String>,
    /// Packages searched for any simple name.
    on_demand: Vec<String>,
}

impl Default for Imports {
    fn default() -> Self {
        Imports {
            single: FxHashMap::default(),
            on_demand: vec!["lang".to_owned()],
        }
    }
}

impl Imports {
    pub fn new() -> Self {
        Imports::default()
    }

    /// Import one class by its fully qualified name. Its simple name
    /// becomes visible, shadowing on-demand packages.
    pub fn add_single(&mut self, qualified_name: &str) {
        let simple = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name)
            .to_owned();
        self.single.insert(simple, qualified_name.to_owned());
    }

    /// Import every class of a package, searched after single imports.
    pub fn add_on_demand(&mut self, package: &str) {
        if !self.on_demand.iter().any(|p| p == package) {
            self.on_demand.push(package.to_owned());
        }
    }

    /// Resolve a simple name to a registered class, if any import
    /// makes it visible.
    pub fn resolve(&self, simple_name: &str, registry: &TypeRegistry) -> Option<Rc<ClassDef>> {
        if let Some(qualified) = self.single.get(simple_name) {
            return registry.lookup(qualified);
        }
        self.on_demand
            .iter()
            .find_map(|package| registry.lookup_in(package, simple_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry.register(ClassDef::new("lang.String"));
        registry.register(ClassDef::new("util.List"));
        registry.register(ClassDef::new("other.List"));
        registry
    }

    #[test]
    fn lang_is_always_visible() {
        let imports = Imports::new();
        let registry = registry();
        assert!(imports.resolve("String", &registry).is_some());
        assert!(imports.resolve("List", &registry).is_none());
    }

    #[test]
    fn single_import_shadows_on_demand() {
        let mut imports = Imports::new();
        let registry = registry();
        imports.add_on_demand("util");
        assert_eq!(
            imports.resolve("List", &registry).map(|c| c.name.clone()),
            Some("util.List".to_owned())
        );
        imports.add_single("other.List");
        assert_eq!(
            imports.resolve("List", &registry).map(|c| c.name.clone()),
            Some("other.List".to_owned())
        );
    }
}
