//! Values bound to PostgreSQL statements.

use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// Filter values and ids are bound as text; row bodies as jsonb.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Text(String),
    Json(Value),
}

pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[BindValue],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::Json(v) => query.bind(v.clone()),
        };
    }
    query
}
