//! The handler side of a compiled route: one method per CRUD action.

use crate::error::AppError;
use crate::routing::Route;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[async_trait]
pub trait CrudController: Send + Sync {
    /// Rows for the index page. `query` holds the raw query string params.
    async fn index(&self, route: &Route, query: &HashMap<String, String>) -> Result<Vec<Value>, AppError>;

    async fn show(&self, route: &Route, id: &str) -> Result<Value, AppError>;

    async fn create(&self, route: &Route, body: Map<String, Value>) -> Result<Value, AppError>;

    async fn update(&self, route: &Route, id: &str, body: Map<String, Value>) -> Result<Value, AppError>;

    async fn delete(&self, route: &Route, id: &str) -> Result<(), AppError>;

    /// Id of a row returned by create/update, used to fill redirect targets.
    fn row_id(&self, row: &Value) -> Option<String> {
        id_of(row, "id")
    }
}

/// Read `column` from a JSON row as a path segment.
pub fn id_of(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
