//! Filters: turn a `{type, value}` descriptor into predicates on a query builder.

mod string;

pub use string::{FilterType, StringFilter};

use crate::error::FilterError;
use serde::{Deserialize, Serialize};

/// The query-building side a filter talks to.
pub trait QueryBuilder {
    type Expr;

    fn equals(&self, field: &str, value: &str) -> Self::Expr;
    fn like(&self, field: &str, pattern: &str) -> Self::Expr;
    fn not_like(&self, field: &str, pattern: &str) -> Self::Expr;
    fn and_where(&mut self, expr: Self::Expr);
}

/// Filter input as submitted by a client. The type tag stays a string until applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

impl FilterDescriptor {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        FilterDescriptor {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

pub trait Filter<Q: QueryBuilder>: Send + Sync {
    /// Whether this filter handles fields declared with `kind` (e.g. `string`).
    fn supports(&self, kind: &str) -> bool;

    /// Add this filter's predicate to `query`, or nothing when the value is empty.
    fn apply(&self, query: &mut Q, field: &str, data: &FilterDescriptor) -> Result<(), FilterError>;
}

/// Picks the filter for a field's declared kind.
pub struct FilterRegistry<Q: QueryBuilder> {
    filters: Vec<Box<dyn Filter<Q>>>,
}

impl<Q: QueryBuilder> Default for FilterRegistry<Q> {
    fn default() -> Self {
        let mut registry = FilterRegistry::empty();
        registry.register(StringFilter);
        registry
    }
}

impl<Q: QueryBuilder> FilterRegistry<Q> {
    pub fn empty() -> Self {
        FilterRegistry { filters: Vec::new() }
    }

    pub fn register(&mut self, filter: impl Filter<Q> + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn get(&self, kind: &str) -> Result<&dyn Filter<Q>, FilterError> {
        self.filters
            .iter()
            .find(|f| f.supports(kind))
            .map(|f| &**f)
            .ok_or_else(|| FilterError::UnsupportedFilterKind(kind.to_string()))
    }

    pub fn apply(
        &self,
        query: &mut Q,
        kind: &str,
        field: &str,
        data: &FilterDescriptor,
    ) -> Result<(), FilterError> {
        self.get(kind)?.apply(query, field, data)
    }
}
