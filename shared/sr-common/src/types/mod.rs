//! Core types.

pub mod actor;
pub mod hierarchy;

pub use actor::*;
pub use hierarchy::*;
