//! Actor Types
//!
//! Read-only view of an account as far as scope resolution is concerned.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hierarchy::StationTier;

/// Account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserCategory {
    /// Ministry staff. The only category positioned in the hierarchy.
    Moh,
    /// Partner organisation staff.
    Ngo,
}

impl UserCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moh => "moh",
            Self::Ngo => "ngo",
        }
    }

    /// Whether accounts of this category can hold a hierarchy scope.
    #[must_use]
    pub const fn is_hierarchy_bearing(self) -> bool {
        matches!(self, Self::Moh)
    }
}

impl fmt::Display for UserCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moh" => Ok(Self::Moh),
            "ngo" => Ok(Self::Ngo),
            other => Err(format!("unknown user category '{other}'")),
        }
    }
}

/// Station fields needed to resolve a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationView {
    pub id: Uuid,
    pub tier: StationTier,
    pub region_id: Option<Uuid>,
    pub subregion_id: Option<Uuid>,
}

/// Actor as seen by the scope resolver.
///
/// `station` is `None` when the account has no profile, or a profile with no
/// assigned station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorView {
    pub is_admin: bool,
    pub category: UserCategory,
    pub station: Option<StationView>,
}
