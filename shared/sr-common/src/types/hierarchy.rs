//! Hierarchy Types
//!
//! Region → SubRegion → Station, plus the validated suffix and code values
//! used to derive station codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Suffix standing in for the region component of national codes, and for a
/// region with no suffix of its own.
pub const NATIONAL_REGION_SUFFIX: &str = "00";

/// Suffix standing in for the sub-region component of codes above sub-region tier.
pub const NO_SUBREGION_SUFFIX: &str = "00";

/// Suffix assigned to a facility created without one.
pub const DEFAULT_FACILITY_SUFFIX: &str = "0A";

/// Length of every suffix component.
pub const SUFFIX_LEN: usize = 2;

/// Length of a full station code.
pub const CODE_LEN: usize = SUFFIX_LEN * 3;

/// Parse failures for hierarchy value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("suffix must be 2 ASCII letters or digits, got '{0}'")]
    Suffix(String),

    #[error("station code must be 6 ASCII letters or digits, got '{0}'")]
    Code(String),

    #[error("unknown station tier '{0}'")]
    Tier(String),
}

fn is_code_text(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Two-character code component. Stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Suffix(String);

impl Suffix {
    /// Parse and normalise a suffix.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let trimmed = value.trim();
        if !is_code_text(trimmed, SUFFIX_LEN) {
            return Err(ParseError::Suffix(value.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Suffix from a compile-time constant known to be valid.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(is_code_text(value, SUFFIX_LEN));
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `00` filler codes use for an absent region or
    /// sub-region. A real region or sub-region must not carry it.
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.0 == NATIONAL_REGION_SUFFIX || self.0 == NO_SUBREGION_SUFFIX
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Suffix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Suffix {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Suffix> for String {
    fn from(value: Suffix) -> Self {
        value.0
    }
}

/// Six-character station code: region, sub-region and tier components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    pub(crate) fn from_parts(region: &Suffix, subregion: &Suffix, station: &Suffix) -> Self {
        Self(format!("{region}{subregion}{station}"))
    }

    /// Parse a stored code.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if !is_code_text(value, CODE_LEN) {
            return Err(ParseError::Code(value.to_string()));
        }
        Ok(Self(value.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Region component.
    #[must_use]
    pub fn region_part(&self) -> &str {
        &self.0[..SUFFIX_LEN]
    }

    /// Sub-region component.
    #[must_use]
    pub fn subregion_part(&self) -> &str {
        &self.0[SUFFIX_LEN..SUFFIX_LEN * 2]
    }

    /// Station (tier) component.
    #[must_use]
    pub fn station_part(&self) -> &str {
        &self.0[SUFFIX_LEN * 2..]
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StationCode {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationCode> for String {
    fn from(value: StationCode) -> Self {
        value.0
    }
}

/// Station tier. Determines code structure and required parents.
///
/// Legacy short labels (`HQ`, `PO`, `DO`, `FC`) are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StationTier {
    /// National head office.
    #[serde(alias = "HQ")]
    National,
    /// Regional (provincial) office.
    #[serde(alias = "PO")]
    Regional,
    /// Sub-regional (district) office.
    #[serde(alias = "DO")]
    SubRegional,
    /// Facility within a sub-region.
    #[serde(alias = "FC")]
    Facility,
}

impl StationTier {
    /// Stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::National => "NATIONAL",
            Self::Regional => "REGIONAL",
            Self::SubRegional => "SUBREGIONAL",
            Self::Facility => "FACILITY",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::National => "National Office",
            Self::Regional => "Regional Office",
            Self::SubRegional => "Sub-regional Office",
            Self::Facility => "Facility",
        }
    }

    /// Reserved suffix for office tiers. Facilities choose their own.
    #[must_use]
    pub const fn fixed_suffix(self) -> Option<&'static str> {
        match self {
            Self::National => Some("NC"),
            Self::Regional => Some("PC"),
            Self::SubRegional => Some("DC"),
            Self::Facility => None,
        }
    }

    #[must_use]
    pub const fn requires_region(self) -> bool {
        !matches!(self, Self::National)
    }

    #[must_use]
    pub const fn requires_subregion(self) -> bool {
        matches!(self, Self::SubRegional | Self::Facility)
    }

    /// All tiers, top down.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::National,
            Self::Regional,
            Self::SubRegional,
            Self::Facility,
        ]
    }

    /// Whether `suffix` is reserved by an office tier.
    #[must_use]
    pub fn is_reserved_suffix(suffix: &Suffix) -> bool {
        Self::all()
            .iter()
            .filter_map(|tier| tier.fixed_suffix())
            .any(|reserved| reserved == suffix.as_str())
    }
}

impl fmt::Display for StationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StationTier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NATIONAL" | "HQ" => Ok(Self::National),
            "REGIONAL" | "PO" => Ok(Self::Regional),
            "SUBREGIONAL" | "DO" => Ok(Self::SubRegional),
            "FACILITY" | "FC" => Ok(Self::Facility),
            _ => Err(ParseError::Tier(s.to_string())),
        }
    }
}

/// Top-level administrative unit (province analog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: Uuid,
    pub name: String,
    /// `None` only for the implicit national region.
    pub suffix: Option<Suffix>,
}

impl Region {
    /// Suffix used in station codes. A region without one counts as national.
    #[must_use]
    pub fn code_suffix(&self) -> Suffix {
        self.suffix
            .clone()
            .unwrap_or_else(|| Suffix::from_static(NATIONAL_REGION_SUFFIX))
    }
}

/// Second-level unit (district analog). Always belongs to one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRegion {
    pub id: Uuid,
    pub name: String,
    pub suffix: Suffix,
    pub region_id: Uuid,
}

/// Office or facility with a derived unique code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tier: StationTier,
    pub region_id: Option<Uuid>,
    pub subregion_id: Option<Uuid>,
    pub suffix: Suffix,
    pub code: StationCode,
}
