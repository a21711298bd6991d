//! Station Registry Server
//!
//! Administrative hierarchy registry with scoped account and asset
//! administration. Station codes and access scopes come from `sr-common`;
//! this crate persists, serves and enforces them.

pub mod accounts;
pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod db;
pub mod hierarchy;
pub mod permissions;
