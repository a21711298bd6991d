//! Scope translation.
//!
//! Turns a [`Scope`] into a [`Predicate`] over a resource collection. Paths
//! are written in canonical field names (`station`, `region`, `subregion`)
//! and each segment is passed through the resource's [`FieldRemap`], so a
//! resource that calls its station reference `current_station` needs only a
//! remap entry, never its own branch here.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use uuid::Uuid;

use super::resolver::Scope;
use crate::types::actor::StationView;

/// Canonical name of a record's station reference.
pub const STATION_FIELD: &str = "station";
/// Canonical name of a station's region reference.
pub const REGION_FIELD: &str = "region";
/// Canonical name of a station's sub-region reference.
pub const SUBREGION_FIELD: &str = "subregion";

/// How a resource's records reach a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationPath {
    /// The record's own `station` field.
    Direct,
    /// The `station` field of exactly one related record (e.g. `profile`).
    Through(String),
}

impl StationPath {
    pub fn through(relation: impl Into<String>) -> Self {
        Self::Through(relation.into())
    }
}

/// Canonical-to-actual field name substitutions for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRemap(BTreeMap<String, String>);

impl FieldRemap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a substitution.
    #[must_use]
    pub fn with(mut self, canonical: impl Into<String>, actual: impl Into<String>) -> Self {
        self.0.insert(canonical.into(), actual.into());
        self
    }

    /// Actual name for a canonical segment; unmapped segments pass through.
    #[must_use]
    pub fn resolve<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.0.get(canonical).map_or(canonical, String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldRemap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Dotted path to a field, in the resource's actual field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    fn new(first: &str) -> Self {
        Self(vec![first.to_string()])
    }

    fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Which hierarchy identifier a clause compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyField {
    Station,
    Region,
    SubRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("=="),
        }
    }
}

/// One `(field-path, comparator, value)` condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub path: FieldPath,
    pub field: HierarchyField,
    pub comparator: Comparator,
    pub value: Uuid,
}

impl Clause {
    fn equals(path: FieldPath, field: HierarchyField, value: Uuid) -> Self {
        Self {
            path,
            field,
            comparator: Comparator::Eq,
            value,
        }
    }

    fn holds<R: ScopedRecord + ?Sized>(&self, record: &R) -> bool {
        match self.comparator {
            Comparator::Eq => record.field(&self.path) == Some(self.value),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.comparator, self.value)
    }
}

/// Filter over a resource collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches nothing.
    MatchNone,
    /// Matches everything; no filter applied.
    MatchAll,
    /// Conjunction of clauses.
    Where(Vec<Clause>),
}

impl Predicate {
    /// Evaluate against one record. Missing fields never match.
    pub fn matches<R: ScopedRecord + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::MatchNone => false,
            Self::MatchAll => true,
            Self::Where(clauses) => clauses.iter().all(|c| c.holds(record)),
        }
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Self::Where(clauses) => clauses,
            Self::MatchNone | Self::MatchAll => &[],
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchNone => f.write_str("false"),
            Self::MatchAll => f.write_str("true"),
            Self::Where(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{clause}")?;
                }
                Ok(())
            }
        }
    }
}

/// A record a predicate can be evaluated against.
pub trait ScopedRecord {
    /// Value of the hierarchy identifier at `path`, if present.
    fn field(&self, path: &FieldPath) -> Option<Uuid>;
}

impl ScopedRecord for HashMap<String, Uuid> {
    fn field(&self, path: &FieldPath) -> Option<Uuid> {
        self.get(&path.to_string()).copied()
    }
}

impl ScopedRecord for BTreeMap<String, Uuid> {
    fn field(&self, path: &FieldPath) -> Option<Uuid> {
        self.get(&path.to_string()).copied()
    }
}

/// A record's station placement, addressed with the same paths `translate`
/// emits for its resource. Unplaced records (`None`) match no clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    station: FieldPath,
    region: FieldPath,
    subregion: FieldPath,
    view: Option<StationView>,
}

impl Placement {
    #[must_use]
    pub fn new(path: &StationPath, remap: &FieldRemap, view: Option<StationView>) -> Self {
        let station = station_path(path, remap);
        Self {
            region: station.child(remap.resolve(REGION_FIELD)),
            subregion: station.child(remap.resolve(SUBREGION_FIELD)),
            station,
            view,
        }
    }
}

impl ScopedRecord for Placement {
    fn field(&self, path: &FieldPath) -> Option<Uuid> {
        let view = self.view?;
        if *path == self.station {
            Some(view.id)
        } else if *path == self.region {
            view.region_id
        } else if *path == self.subregion {
            view.subregion_id
        } else {
            None
        }
    }
}

fn station_path(path: &StationPath, remap: &FieldRemap) -> FieldPath {
    match path {
        StationPath::Direct => FieldPath::new(remap.resolve(STATION_FIELD)),
        StationPath::Through(relation) => {
            FieldPath::new(remap.resolve(relation)).child(remap.resolve(STATION_FIELD))
        }
    }
}

/// Translate a scope into a predicate for a resource reaching stations via
/// `path`, with field names substituted through `remap`.
pub fn translate(scope: &Scope, path: &StationPath, remap: &FieldRemap) -> Predicate {
    let station = station_path(path, remap);
    match *scope {
        Scope::Denied => Predicate::MatchNone,
        Scope::Unrestricted => Predicate::MatchAll,
        Scope::RegionFiltered { region_id } => Predicate::Where(vec![Clause::equals(
            station.child(remap.resolve(REGION_FIELD)),
            HierarchyField::Region,
            region_id,
        )]),
        Scope::SubRegionFiltered { subregion_id } => Predicate::Where(vec![Clause::equals(
            station.child(remap.resolve(SUBREGION_FIELD)),
            HierarchyField::SubRegion,
            subregion_id,
        )]),
        Scope::StationFiltered { station_id } => Predicate::Where(vec![Clause::equals(
            station,
            HierarchyField::Station,
            station_id,
        )]),
    }
}
