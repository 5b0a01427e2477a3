//! # Module descriptor.
//!
//! Immutable identity + dependency declaration for one catalog entry, captured
//! once when the catalog is built.

use std::sync::Arc;

use crate::modules::module::Module;

/// Name, declared dependencies and essential flag of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: Arc<str>,
    dependencies: Arc<[String]>,
    essential: bool,
}

impl ModuleDescriptor {
    pub(crate) fn of(module: &dyn Module, essential: bool) -> Self {
        Self {
            name: Arc::from(module.name()),
            dependencies: Arc::from(module.dependencies()),
            essential,
        }
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Declared dependency names, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// True if this module belongs to the essential bootstrap prefix.
    pub fn is_essential(&self) -> bool {
        self.essential
    }

    /// True if every declared dependency is matched by a name in `started`.
    ///
    /// A dependency `d` is matched by any started name that begins with `d`.
    pub fn is_satisfied_by<'a, I>(&self, started: I) -> bool
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.dependencies
            .iter()
            .all(|dep| started.clone().into_iter().any(|s| s.starts_with(dep.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ModuleFn, StartContext};

    fn descriptor(name: &'static str, deps: &[&str]) -> ModuleDescriptor {
        let module = ModuleFn::new(name, |_ctx: StartContext| async { Ok(()) })
            .depends_on(deps.iter().copied())
            .into_ref();
        ModuleDescriptor::of(module.as_ref(), false)
    }

    #[test]
    fn no_dependencies_is_always_satisfied() {
        let d = descriptor("core", &[]);
        assert!(d.is_satisfied_by(std::iter::empty::<&str>()));
    }

    #[test]
    fn dependency_is_matched_by_prefix() {
        let d = descriptor("web", &["jdbc", "logging"]);
        assert!(d.is_satisfied_by(["logging", "jdbc-postgres"]));
        assert!(!d.is_satisfied_by(["logging", "jd"]));
        assert!(!d.is_satisfied_by(["jdbc"]));
    }

    #[test]
    fn exact_name_satisfies_itself() {
        let d = descriptor("c", &["a", "b"]);
        assert!(d.is_satisfied_by(["b", "a"]));
    }
}
