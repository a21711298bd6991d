//! Station code generation.
//!
//! A code is `region suffix + sub-region suffix + station suffix`, two
//! characters each. Tiers above sub-region fill the missing components with
//! `00`. Office tiers use a reserved station suffix; facilities pick their own
//! and fall back to [`DEFAULT_FACILITY_SUFFIX`].
//!
//! The generator does not check uniqueness. Callers must check the result
//! against stored codes inside the same transaction that writes it.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::types::hierarchy::{
    Region, StationCode, StationTier, SubRegion, Suffix, DEFAULT_FACILITY_SUFFIX,
    NATIONAL_REGION_SUFFIX, NO_SUBREGION_SUFFIX,
};

/// Parent reference kind, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Region,
    SubRegion,
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => f.write_str("region"),
            Self::SubRegion => f.write_str("sub-region"),
        }
    }
}

/// Code generation failures. Any of these must abort the station write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("{tier} station requires a {parent}")]
    MissingParent {
        tier: StationTier,
        parent: ParentKind,
    },

    #[error("{tier} station must not reference a {parent}")]
    UnexpectedParent {
        tier: StationTier,
        parent: ParentKind,
    },

    #[error("sub-region {subregion_id} belongs to region {actual_region_id}, not {expected_region_id}")]
    InconsistentHierarchy {
        subregion_id: Uuid,
        expected_region_id: Uuid,
        actual_region_id: Uuid,
    },

    #[error("{tier} station suffix must be '{expected}', got '{given}'")]
    InvalidSuffix {
        tier: StationTier,
        expected: &'static str,
        given: Suffix,
    },

    #[error("suffix '{given}' is reserved for office stations")]
    ReservedSuffix { given: Suffix },
}

impl CodeError {
    /// Stable machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingParent { .. } => "missing_parent",
            Self::UnexpectedParent { .. } => "unexpected_parent",
            Self::InconsistentHierarchy { .. } => "inconsistent_hierarchy",
            Self::InvalidSuffix { .. } | Self::ReservedSuffix { .. } => "invalid_suffix",
        }
    }
}

/// A generated code together with the station suffix it was built from.
///
/// The suffix is returned so the caller persists the auto-filled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: StationCode,
    pub suffix: Suffix,
}

/// Generate the code for a station.
///
/// Checks run in order: station suffix, required parents, forbidden parents,
/// sub-region/region consistency.
pub fn generate_code(
    tier: StationTier,
    region: Option<&Region>,
    subregion: Option<&SubRegion>,
    suffix: Option<&Suffix>,
) -> Result<GeneratedCode, CodeError> {
    let suffix = station_suffix(tier, suffix)?;

    let region = parent(tier, ParentKind::Region, tier.requires_region(), region)?;
    let subregion = parent(
        tier,
        ParentKind::SubRegion,
        tier.requires_subregion(),
        subregion,
    )?;

    if let (Some(region), Some(subregion)) = (region, subregion) {
        if subregion.region_id != region.id {
            return Err(CodeError::InconsistentHierarchy {
                subregion_id: subregion.id,
                expected_region_id: region.id,
                actual_region_id: subregion.region_id,
            });
        }
    }

    let region_part = region.map_or_else(
        || Suffix::from_static(NATIONAL_REGION_SUFFIX),
        Region::code_suffix,
    );
    let subregion_part = subregion.map_or_else(
        || Suffix::from_static(NO_SUBREGION_SUFFIX),
        |s| s.suffix.clone(),
    );

    Ok(GeneratedCode {
        code: StationCode::from_parts(&region_part, &subregion_part, &suffix),
        suffix,
    })
}

fn station_suffix(tier: StationTier, given: Option<&Suffix>) -> Result<Suffix, CodeError> {
    match (tier.fixed_suffix(), given) {
        (Some(expected), Some(given)) if given.as_str() != expected => {
            Err(CodeError::InvalidSuffix {
                tier,
                expected,
                given: given.clone(),
            })
        }
        (Some(expected), _) => Ok(Suffix::from_static(expected)),
        (None, Some(given)) if StationTier::is_reserved_suffix(given) => {
            Err(CodeError::ReservedSuffix {
                given: given.clone(),
            })
        }
        (None, Some(given)) => Ok(given.clone()),
        (None, None) => Ok(Suffix::from_static(DEFAULT_FACILITY_SUFFIX)),
    }
}

fn parent<T>(
    tier: StationTier,
    kind: ParentKind,
    required: bool,
    value: Option<&T>,
) -> Result<Option<&T>, CodeError> {
    match (required, value) {
        (true, None) => Err(CodeError::MissingParent { tier, parent: kind }),
        (false, Some(_)) => Err(CodeError::UnexpectedParent { tier, parent: kind }),
        (_, value) => Ok(value),
    }
}
