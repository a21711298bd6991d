//! Authentication Boundary
//!
//! Bearer token verification. Token issuance belongs to the identity
//! provider; `jwt::generate_access_token` mints compatible tokens for tooling.

mod error;
pub mod jwt;
mod middleware;

pub use error::{AuthError, AuthResult};
pub use middleware::{require_auth, AuthUser};
