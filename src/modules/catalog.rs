//! # Module catalog.
//!
//! The [`Catalog`] is the frozen set of modules known to an orchestrator. It is
//! built once (from a [`ModuleProvider`] or with [`CatalogBuilder`]) and never
//! changes afterwards: entries live in an `Arc<[_]>`, so sharing it with
//! concurrent scheduling passes needs no lock.
//!
//! ## Layout
//! ```text
//! [ essential₀, essential₁, …, essentialₖ₋₁ | module, module, … ]
//!   └── started sequentially, in order ──┘   └── wavefront ──┘
//! ```
//!
//! ## Rules
//! - Names are unique; a duplicate fails construction with `DuplicateModule`.
//! - The essential prefix is positional: the first `k` entries.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ActivationError;
use crate::modules::descriptor::ModuleDescriptor;
use crate::modules::module::ModuleRef;

/// Source of modules for a catalog (plugin loader, static registry, ...).
pub trait ModuleProvider {
    /// All modules, essential prefix first.
    fn list_all_modules(&self) -> Vec<ModuleRef>;

    /// How many leading entries of [`list_all_modules`](Self::list_all_modules) are essential.
    fn essential_count(&self) -> usize {
        0
    }
}

#[derive(Clone)]
pub(crate) struct CatalogEntry {
    pub(crate) descriptor: ModuleDescriptor,
    pub(crate) module: ModuleRef,
}

/// Immutable set of modules with an essential prefix.
#[derive(Clone)]
pub struct Catalog {
    entries: Arc<[CatalogEntry]>,
    essential: usize,
}

impl Catalog {
    /// Starts building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Loads every module from `provider` once.
    pub fn load<P: ModuleProvider + ?Sized>(provider: &P) -> Result<Self, ActivationError> {
        Self::new(provider.list_all_modules(), provider.essential_count())
    }

    /// Builds a catalog whose first `essential` modules form the bootstrap prefix.
    ///
    /// `essential` is clamped to the number of modules.
    pub fn new(modules: Vec<ModuleRef>, essential: usize) -> Result<Self, ActivationError> {
        let essential = essential.min(modules.len());
        let mut seen = HashSet::with_capacity(modules.len());
        let mut entries = Vec::with_capacity(modules.len());

        for (idx, module) in modules.into_iter().enumerate() {
            if !seen.insert(module.name().to_string()) {
                return Err(ActivationError::DuplicateModule {
                    name: module.name().to_string(),
                });
            }
            entries.push(CatalogEntry {
                descriptor: ModuleDescriptor::of(module.as_ref(), idx < essential),
                module,
            });
        }

        Ok(Self {
            entries: entries.into(),
            essential,
        })
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the catalog has no modules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in catalog order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Descriptor by exact name.
    pub fn descriptor(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.index_of(name).map(|idx| &self.entries[idx].descriptor)
    }

    /// Names of the essential prefix, in bootstrap order.
    pub fn essential_names(&self) -> Vec<&str> {
        self.essential_entries()
            .iter()
            .map(|e| e.descriptor.name())
            .collect()
    }

    pub(crate) fn essential_entries(&self) -> &[CatalogEntry] {
        &self.entries[..self.essential]
    }

    pub(crate) fn entry(&self, idx: usize) -> &CatalogEntry {
        &self.entries[idx]
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.descriptor.name() == name)
    }

    /// Resolves a requested name list into the non-essential catalog indices to schedule.
    ///
    /// - Every name must exist, otherwise `UnknownModuleRequested` lists all unknown names.
    /// - Repeated names are collapsed, first occurrence wins.
    /// - Essential names are dropped: the bootstrap always starts them.
    pub(crate) fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<Vec<usize>, ActivationError> {
        let mut unknown = Vec::new();
        let mut indices = Vec::with_capacity(requested.len());

        for name in requested {
            let name = name.as_ref();
            match self.index_of(name) {
                None => {
                    if !unknown.iter().any(|u: &String| u == name) {
                        unknown.push(name.to_string());
                    }
                }
                Some(idx) if idx < self.essential || indices.contains(&idx) => {}
                Some(idx) => indices.push(idx),
            }
        }

        if unknown.is_empty() {
            Ok(indices)
        } else {
            Err(ActivationError::UnknownModuleRequested { names: unknown })
        }
    }
}

/// Incremental [`Catalog`] construction; essential modules keep the order they were added in.
#[derive(Default)]
pub struct CatalogBuilder {
    essential: Vec<ModuleRef>,
    modules: Vec<ModuleRef>,
}

impl CatalogBuilder {
    /// Appends a module to the essential bootstrap prefix.
    pub fn essential(mut self, module: ModuleRef) -> Self {
        self.essential.push(module);
        self
    }

    /// Appends a regular module.
    pub fn module(mut self, module: ModuleRef) -> Self {
        self.modules.push(module);
        self
    }

    /// Appends several regular modules.
    pub fn modules(mut self, modules: impl IntoIterator<Item = ModuleRef>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Freezes the catalog.
    pub fn build(self) -> Result<Catalog, ActivationError> {
        let essential = self.essential.len();
        let mut all = self.essential;
        all.extend(self.modules);
        Catalog::new(all, essential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ModuleFn, StartContext};

    fn module(name: &'static str) -> ModuleRef {
        ModuleFn::new(name, |_ctx: StartContext| async { Ok(()) }).into_ref()
    }

    fn sample() -> Catalog {
        Catalog::builder()
            .essential(module("core"))
            .essential(module("config"))
            .module(module("web"))
            .module(module("jdbc"))
            .build()
            .unwrap()
    }

    #[test]
    fn essential_prefix_keeps_builder_order() {
        let catalog = sample();
        assert_eq!(catalog.essential_names(), vec!["core", "config"]);
        assert!(catalog.descriptor("config").unwrap().is_essential());
        assert!(!catalog.descriptor("web").unwrap().is_essential());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Catalog::builder()
            .module(module("web"))
            .module(module("web"))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ActivationError::DuplicateModule { name: "web".into() });
    }

    #[test]
    fn resolve_reports_every_unknown_name() {
        let err = sample()
            .resolve(&["core", "ghost", "web", "phantom", "ghost"])
            .unwrap_err();
        assert_eq!(
            err,
            ActivationError::UnknownModuleRequested {
                names: vec!["ghost".into(), "phantom".into()],
            }
        );
    }

    #[test]
    fn resolve_drops_essentials_and_duplicates() {
        let catalog = sample();
        let idx = catalog
            .resolve(&["core", "jdbc", "config", "web", "jdbc"])
            .unwrap();
        let names: Vec<&str> = idx
            .iter()
            .map(|i| catalog.entry(*i).descriptor.name())
            .collect();
        assert_eq!(names, vec!["jdbc", "web"]);
    }

    struct Static(Vec<ModuleRef>);

    impl ModuleProvider for Static {
        fn list_all_modules(&self) -> Vec<ModuleRef> {
            self.0.clone()
        }
        fn essential_count(&self) -> usize {
            1
        }
    }

    #[test]
    fn load_from_provider() {
        let catalog = Catalog::load(&Static(vec![module("core"), module("web")])).unwrap();
        assert_eq!(catalog.essential_names(), vec!["core"]);
        assert_eq!(
            catalog.descriptors().map(|d| d.name()).collect::<Vec<_>>(),
            vec!["core", "web"]
        );
    }
}
