//! Scope resolution.
//!
//! Maps an actor's privilege flag, category and assigned station to the part
//! of the hierarchy they may administer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::actor::ActorView;
use crate::types::hierarchy::StationTier;

/// Access boundary of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// No access.
    Denied,
    /// Whole hierarchy.
    Unrestricted,
    /// Everything under one region.
    RegionFiltered { region_id: Uuid },
    /// Everything under one sub-region.
    SubRegionFiltered { subregion_id: Uuid },
    /// One station only.
    StationFiltered { station_id: Uuid },
}

impl Scope {
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

/// Resolve the scope of an actor.
///
/// Rules:
/// 1. Non-admins, non-hierarchy categories and actors without a station are denied
/// 2. National station: unrestricted
/// 3. Regional station: its region
/// 4. Sub-regional station: its sub-region
/// 5. Facility: that station
///
/// A station missing the parent its tier needs resolves to `Denied`.
pub fn resolve_scope(actor: &ActorView) -> Scope {
    if !actor.is_admin || !actor.category.is_hierarchy_bearing() {
        return Scope::Denied;
    }

    let Some(station) = actor.station else {
        return Scope::Denied;
    };

    match station.tier {
        StationTier::National => Scope::Unrestricted,
        StationTier::Regional => station
            .region_id
            .map_or(Scope::Denied, |region_id| Scope::RegionFiltered { region_id }),
        StationTier::SubRegional => station
            .subregion_id
            .map_or(Scope::Denied, |subregion_id| Scope::SubRegionFiltered {
                subregion_id,
            }),
        StationTier::Facility => Scope::StationFiltered {
            station_id: station.id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::actor::{StationView, UserCategory};

    fn station(tier: StationTier) -> StationView {
        StationView {
            id: Uuid::new_v4(),
            tier,
            region_id: Some(Uuid::new_v4()),
            subregion_id: Some(Uuid::new_v4()),
        }
    }

    fn admin(station: Option<StationView>) -> ActorView {
        ActorView {
            is_admin: true,
            category: UserCategory::Moh,
            station,
        }
    }

    #[test]
    fn test_non_admin_always_denied() {
        for category in [UserCategory::Moh, UserCategory::Ngo] {
            for tier in StationTier::all() {
                let actor = ActorView {
                    is_admin: false,
                    category,
                    station: Some(station(*tier)),
                };
                assert_eq!(resolve_scope(&actor), Scope::Denied);
            }
            let actor = ActorView {
                is_admin: false,
                category,
                station: None,
            };
            assert_eq!(resolve_scope(&actor), Scope::Denied);
        }
    }

    #[test]
    fn test_partner_admin_denied() {
        let actor = ActorView {
            is_admin: true,
            category: UserCategory::Ngo,
            station: Some(station(StationTier::National)),
        };
        assert_eq!(resolve_scope(&actor), Scope::Denied);
    }

    #[test]
    fn test_admin_without_station_denied() {
        let scope = resolve_scope(&admin(None));
        assert_eq!(scope, Scope::Denied);
        assert!(scope.is_denied());
        assert!(!scope.is_unrestricted());
    }

    #[test]
    fn test_national_unrestricted() {
        let scope = resolve_scope(&admin(Some(station(StationTier::National))));
        assert_eq!(scope, Scope::Unrestricted);
        assert!(scope.is_unrestricted());
        assert!(!scope.is_denied());
    }

    #[test]
    fn test_regional_filters_on_region() {
        let s = station(StationTier::Regional);
        assert_eq!(
            resolve_scope(&admin(Some(s))),
            Scope::RegionFiltered {
                region_id: s.region_id.unwrap()
            }
        );
    }

    #[test]
    fn test_subregional_filters_on_subregion() {
        let s = station(StationTier::SubRegional);
        assert_eq!(
            resolve_scope(&admin(Some(s))),
            Scope::SubRegionFiltered {
                subregion_id: s.subregion_id.unwrap()
            }
        );
    }

    #[test]
    fn test_facility_filters_on_station() {
        let s = station(StationTier::Facility);
        assert_eq!(
            resolve_scope(&admin(Some(s))),
            Scope::StationFiltered { station_id: s.id }
        );
    }

    #[test]
    fn test_station_missing_parent_denied() {
        let mut s = station(StationTier::Regional);
        s.region_id = None;
        assert_eq!(resolve_scope(&admin(Some(s))), Scope::Denied);

        let mut s = station(StationTier::SubRegional);
        s.subregion_id = None;
        assert_eq!(resolve_scope(&admin(Some(s))), Scope::Denied);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let actor = admin(Some(station(StationTier::SubRegional)));
        assert_eq!(resolve_scope(&actor), resolve_scope(&actor));
    }

    #[test]
    fn test_scope_serialization() {
        let region_id = Uuid::new_v4();
        let json = serde_json::to_value(Scope::RegionFiltered { region_id }).unwrap();
        assert_eq!(json["kind"], "region_filtered");
        assert_eq!(json["region_id"], region_id.to_string());

        let json = serde_json::to_value(Scope::Denied).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "denied" }));
    }
}
