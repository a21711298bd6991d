//! Station Registry Common Library
//!
//! Pure core shared by the server and any tooling: the administrative
//! hierarchy model, station code generation, and access scope resolution.
//! Nothing in this crate performs I/O or holds state between calls.

pub mod code;
pub mod scope;
pub mod types;

pub use code::{generate_code, CodeError, GeneratedCode};
pub use scope::{
    resolve_scope, translate, FieldPath, FieldRemap, Placement, Predicate, Scope, StationPath,
};
pub use types::*;
