//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a configured table.
//! Every statement yields rows as a single `data` JSON column.

use crate::config::StorageConfig;
use crate::filter::QueryBuilder;
use crate::sql::BindValue;
use serde_json::{Map, Value};
use std::fmt;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: u32 = 100;
/// Upper bound on page size.
pub const MAX_LIMIT: u32 = 1000;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote each segment of a dotted field reference (`a.city` -> `"a"."city"`).
pub fn quoted_field(field: &str) -> String {
    field.split('.').map(quoted).collect::<Vec<_>>().join(".")
}

pub fn qualified_table(storage: &StorageConfig) -> String {
    format!("{}.{}", quoted(&storage.schema), quoted(&storage.table))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Like,
    NotLike,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Like => "LIKE",
            Comparison::NotLike => "NOT LIKE",
        }
    }
}

/// A single condition on one field. Displays inline for logs: `city LIKE '%ar%'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub field: String,
    pub comparison: Comparison,
    pub value: String,
}

impl Predicate {
    /// Parameterized form; the column is compared as text so filters work on any column type.
    fn to_sql(&self, q: &mut QueryBuf) -> String {
        let n = q.push_param(BindValue::Text(self.value.clone()));
        format!(
            "{}::text {} ${}",
            quoted_field(&self.field),
            self.comparison.operator(),
            n
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}'",
            self.field,
            self.comparison.operator(),
            self.value.replace('\'', "''")
        )
    }
}

/// List query over one table. Predicates are ANDed in the order they were added.
#[derive(Clone, Debug)]
pub struct SelectQuery {
    table: String,
    order_by: Option<String>,
    predicates: Vec<Predicate>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl SelectQuery {
    pub fn new(storage: &StorageConfig) -> Self {
        SelectQuery {
            table: qualified_table(storage),
            order_by: Some(storage.id_column.clone()),
            predicates: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n.min(MAX_LIMIT));
        self
    }

    pub fn offset(mut self, n: u32) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        let where_parts: Vec<String> = self.predicates.iter().map(|p| p.to_sql(&mut q)).collect();
        let where_clause = if where_parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_parts.join(" AND "))
        };
        let order_clause = self
            .order_by
            .as_deref()
            .map(|c| format!(" ORDER BY {}", quoted(c)))
            .unwrap_or_default();
        let limit_clause = self.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
        let offset_clause = self.offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
        q.sql = format!(
            "SELECT row_to_json(r) AS data FROM (SELECT * FROM {}{}{}{}{}) r",
            self.table, where_clause, order_clause, limit_clause, offset_clause
        );
        q
    }
}

impl QueryBuilder for SelectQuery {
    type Expr = Predicate;

    fn equals(&self, field: &str, value: &str) -> Predicate {
        Predicate {
            field: field.to_string(),
            comparison: Comparison::Eq,
            value: value.to_string(),
        }
    }

    fn like(&self, field: &str, pattern: &str) -> Predicate {
        Predicate {
            field: field.to_string(),
            comparison: Comparison::Like,
            value: pattern.to_string(),
        }
    }

    fn not_like(&self, field: &str, pattern: &str) -> Predicate {
        Predicate {
            field: field.to_string(),
            comparison: Comparison::NotLike,
            value: pattern.to_string(),
        }
    }

    fn and_where(&mut self, expr: Predicate) {
        self.predicates.push(expr);
    }
}

fn wrap_json(inner: &str) -> String {
    format!("WITH r AS ({}) SELECT row_to_json(r) AS data FROM r", inner)
}

fn id_condition(storage: &StorageConfig, param: usize) -> String {
    format!("{}::text = ${}", quoted(&storage.id_column), param)
}

/// SELECT by id. Caller's id is the sole param.
pub fn select_by_id(storage: &StorageConfig, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Text(id.to_string()));
    q.sql = format!(
        "SELECT row_to_json(r) AS data FROM (SELECT * FROM {} WHERE {}) r",
        qualified_table(storage),
        id_condition(storage, n)
    );
    q
}

/// INSERT the body's keys; values are coerced to column types by `jsonb_populate_record`.
/// Columns missing from the body keep their defaults.
pub fn insert(storage: &StorageConfig, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(storage);
    if body.is_empty() {
        q.sql = wrap_json(&format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table));
        return q;
    }
    let cols = body.keys().map(|k| quoted(k)).collect::<Vec<_>>().join(", ");
    let n = q.push_param(BindValue::Json(Value::Object(body.clone())));
    q.sql = wrap_json(&format!(
        "INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, ${n}::jsonb) RETURNING *",
    ));
    q
}

/// UPDATE by id: SET only the body's keys, never the id column.
/// With nothing to set this degrades to a select by id.
pub fn update(storage: &StorageConfig, id: &str, body: &Map<String, Value>) -> QueryBuf {
    let sets: Map<String, Value> = body
        .iter()
        .filter(|(k, _)| **k != storage.id_column)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if sets.is_empty() {
        return select_by_id(storage, id);
    }
    let mut q = QueryBuf::new();
    let table = qualified_table(storage);
    let cols = sets.keys().map(|k| quoted(k)).collect::<Vec<_>>().join(", ");
    let body_param = q.push_param(BindValue::Json(Value::Object(sets)));
    let id_param = q.push_param(BindValue::Text(id.to_string()));
    q.sql = wrap_json(&format!(
        "UPDATE {table} SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, ${body_param}::jsonb)) WHERE {cond} RETURNING *",
        cond = id_condition(storage, id_param),
    ));
    q
}

/// DELETE by id, returning the removed row.
pub fn delete(storage: &StorageConfig, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Text(id.to_string()));
    q.sql = wrap_json(&format!(
        "DELETE FROM {} WHERE {} RETURNING *",
        qualified_table(storage),
        id_condition(storage, n)
    ));
    q
}
