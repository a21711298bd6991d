//! Predicate rendering for SQL queries.

use sqlx::{Postgres, QueryBuilder};
use sr_common::scope::{Comparator, Predicate};
use sr_common::{translate, FieldPath, FieldRemap, Placement, Scope, StationPath, StationView};

/// SQL column for each field path a resource's predicates can name.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap(&'static [(&'static str, &'static str)]);

impl ColumnMap {
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn column(&self, path: &FieldPath) -> Option<&'static str> {
        let key = path.to_string();
        self.0
            .iter()
            .find(|(field, _)| *field == key)
            .map(|(_, column)| *column)
    }
}

/// How one protected resource reaches stations.
#[derive(Debug, Clone)]
pub struct ResourceScope {
    /// Resource name, for logs.
    pub name: &'static str,
    pub path: StationPath,
    pub remap: FieldRemap,
    pub columns: ColumnMap,
}

impl ResourceScope {
    /// Collection filter for `scope`.
    #[must_use]
    pub fn predicate(&self, scope: &Scope) -> Predicate {
        translate(scope, &self.path, &self.remap)
    }

    /// Append the filter for `scope` to a query's `WHERE` clause.
    pub fn push_filter(&self, builder: &mut QueryBuilder<'_, Postgres>, scope: &Scope) {
        let predicate = self.predicate(scope);
        tracing::debug!(resource = self.name, %predicate, "Applying scope filter");
        push_predicate(builder, &predicate, &self.columns);
    }

    /// Whether a record placed at `station` lies inside `scope`.
    #[must_use]
    pub fn permits(&self, scope: &Scope, station: Option<StationView>) -> bool {
        let placement = Placement::new(&self.path, &self.remap, station);
        self.predicate(scope).matches(&placement)
    }
}

/// Append `predicate` as a boolean SQL expression.
///
/// Clauses whose path has no column render the whole predicate as `FALSE`.
pub fn push_predicate(
    builder: &mut QueryBuilder<'_, Postgres>,
    predicate: &Predicate,
    columns: &ColumnMap,
) {
    let clauses = match predicate {
        Predicate::MatchNone => {
            builder.push("FALSE");
            return;
        }
        Predicate::MatchAll => {
            builder.push("TRUE");
            return;
        }
        Predicate::Where(clauses) => clauses,
    };

    let mut resolved = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let Some(column) = columns.column(&clause.path) else {
            tracing::warn!(path = %clause.path, "No column for predicate path, matching nothing");
            builder.push("FALSE");
            return;
        };
        resolved.push((column, clause));
    }

    builder.push("(");
    for (i, (column, clause)) in resolved.into_iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        builder.push(column);
        match clause.comparator {
            Comparator::Eq => builder.push(" = "),
        };
        builder.push_bind(clause.value);
    }
    builder.push(")");
}
