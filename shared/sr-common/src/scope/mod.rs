//! Access scopes.
//!
//! Resolution maps an actor to a [`Scope`]; translation turns a scope into a
//! [`Predicate`] over any resource collection that references stations.

pub mod resolver;
pub mod translate;

pub use resolver::{resolve_scope, Scope};
pub use translate::{
    translate, Clause, Comparator, FieldPath, FieldRemap, HierarchyField, Placement,
    Predicate, ScopedRecord, StationPath,
};
