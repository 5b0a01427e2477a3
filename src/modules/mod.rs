//! # Module contract and catalog.
//!
//! This module provides the module-related types:
//! - [`Module`] - trait every activatable module implements
//! - [`ModuleFn`] - closure-backed module implementation
//! - [`ModuleRef`] - shared reference to a module (`Arc<dyn Module>`)
//! - [`ModuleDescriptor`] - immutable name + dependency declaration
//! - [`Catalog`] - frozen set of modules with an essential prefix
//! - [`Exports`] - type-keyed registry modules publish objects into

mod catalog;
mod descriptor;
mod exports;
mod module;
mod module_fn;

pub(crate) use catalog::CatalogEntry;
pub use catalog::{Catalog, CatalogBuilder, ModuleProvider};
pub use descriptor::ModuleDescriptor;
pub use exports::Exports;
pub use module::{Module, ModuleConfig, ModuleRef, StartContext};
pub use module_fn::ModuleFn;
