//! String filter: equal / contains / not_contains.

use crate::error::FilterError;
use crate::filter::{Filter, FilterDescriptor, QueryBuilder};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    Equal,
    Contains,
    NotContains,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Equal => "equal",
            FilterType::Contains => "contains",
            FilterType::NotContains => "not_contains",
        }
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(FilterType::Equal),
            "contains" => Ok(FilterType::Contains),
            "not_contains" => Ok(FilterType::NotContains),
            other => Err(FilterError::UnsupportedFilterType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StringFilter;

impl StringFilter {
    pub const KIND: &'static str = "string";

    /// Expression for a non-empty value. `contains` wraps the value in `%` wildcards.
    pub fn expression<Q: QueryBuilder>(
        query: &Q,
        field: &str,
        kind: FilterType,
        value: &str,
    ) -> Q::Expr {
        match kind {
            FilterType::Equal => query.equals(field, value),
            FilterType::Contains => query.like(field, &format!("%{}%", value)),
            FilterType::NotContains => query.not_like(field, &format!("%{}%", value)),
        }
    }
}

impl<Q: QueryBuilder> Filter<Q> for StringFilter {
    fn supports(&self, kind: &str) -> bool {
        kind == Self::KIND
    }

    fn apply(&self, query: &mut Q, field: &str, data: &FilterDescriptor) -> Result<(), FilterError> {
        if data.value.is_empty() {
            return Ok(());
        }
        let kind: FilterType = data.kind.parse()?;
        let expr = Self::expression(query, field, kind, &data.value);
        query.and_where(expr);
        Ok(())
    }
}
