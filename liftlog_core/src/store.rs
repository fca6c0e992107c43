//! Generic tabular record store.
//!
//! The store exposes the five operation shapes the rest of the system is
//! written against: select, insert, update, delete, and upsert. Rows are
//! typed; each row type binds itself to a table via the [`Record`] trait.
//! Filters match against the serde-JSON image of a row, so any serialized
//! field can be used as a predicate target.

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A row type bound to a named table
///
/// `id() == None` means the row has not been persisted yet; stores assign
/// a fresh identifier on insert/upsert and hand the row back with it set.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Table this row type lives in
    const TABLE: &'static str;

    /// Persisted identifier, if any
    fn id(&self) -> Option<Uuid>;

    /// Attach a store-assigned identifier
    fn assign_id(&mut self, id: Uuid);
}

/// Table-oriented CRUD operations
///
/// Every operation may fail with a store error; callers propagate those
/// unchanged rather than retrying.
pub trait RecordStore {
    /// Fetch rows matching `filter`, optionally ordered and truncated
    fn select<R: Record>(
        &self,
        filter: &Filter,
        order: Option<&Order>,
        limit: Option<usize>,
    ) -> Result<Vec<R>>;

    /// Persist new rows, assigning identifiers to id-less ones
    ///
    /// Returns the rows with their assigned identifiers.
    fn insert<R: Record>(&self, rows: Vec<R>) -> Result<Vec<R>>;

    /// Replace the single row matching `filter` with `row`
    ///
    /// Zero matches is a not-found error; more than one is a store error.
    fn update<R: Record>(&self, row: &R, filter: &Filter) -> Result<R>;

    /// Remove all rows matching `filter`, returning how many went away
    fn delete<R: Record>(&self, filter: &Filter) -> Result<usize>;

    /// Insert-or-update by identifier
    ///
    /// Rows carrying an identifier replace the stored row with that
    /// identifier (or are inserted under it if none exists); id-less rows
    /// are assigned fresh identifiers and inserted.
    fn upsert<R: Record>(&self, rows: Vec<R>) -> Result<Vec<R>>;
}

#[derive(Clone, Debug)]
enum Predicate {
    Eq(Value),
    In(Vec<Value>),
}

/// Conjunction of field predicates
///
/// An empty filter matches every row.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    predicates: Vec<(String, Predicate)>,
}

impl Filter {
    /// Filter that matches every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn eq(mut self, field: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.predicates.push((field.to_string(), Predicate::Eq(value)));
        self
    }

    /// Require `field` to equal one of `values`
    pub fn is_in<I, T>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let values = values
            .into_iter()
            .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
            .collect();
        self.predicates
            .push((field.to_string(), Predicate::In(values)));
        self
    }

    /// Test the filter against the serde-JSON image of a row
    pub fn matches(&self, row: &Value) -> bool {
        self.predicates.iter().all(|(field, predicate)| {
            let actual = row.get(field).unwrap_or(&Value::Null);
            match predicate {
                Predicate::Eq(expected) => actual == expected,
                Predicate::In(candidates) => candidates.iter().any(|c| c == actual),
            }
        })
    }

    /// True when the filter has no predicates
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Sort directive for select
#[derive(Clone, Debug)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

impl Order {
    /// Ascending order on `field`
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    /// Descending order on `field`
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_matches_anything() {
        let filter = Filter::all();
        assert!(filter.matches(&json!({"id": "abc"})));
        assert!(filter.matches(&json!({})));
    }

    #[test]
    fn test_eq_predicate() {
        let filter = Filter::all().eq("name", "Run");
        assert!(filter.matches(&json!({"name": "Run", "reps": 5})));
        assert!(!filter.matches(&json!({"name": "Row"})));
        assert!(!filter.matches(&json!({})));
    }

    #[test]
    fn test_predicates_conjoin() {
        let filter = Filter::all().eq("a", 1).eq("b", 2);
        assert!(filter.matches(&json!({"a": 1, "b": 2})));
        assert!(!filter.matches(&json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_in_predicate() {
        let filter = Filter::all().is_in("id", ["x", "y"]);
        assert!(filter.matches(&json!({"id": "x"})));
        assert!(filter.matches(&json!({"id": "y"})));
        assert!(!filter.matches(&json!({"id": "z"})));
    }

    #[test]
    fn test_missing_field_matches_null() {
        let filter = Filter::all().eq("gone", Option::<u32>::None);
        assert!(filter.matches(&json!({"other": 1})));
    }
}
