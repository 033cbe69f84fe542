//! Generic CRUD execution against PostgreSQL for one configured resource.

use crate::config::ResourceConfig;
use crate::error::AppError;
use crate::filter::{FilterDescriptor, FilterRegistry};
use crate::routing::Route;
use crate::service::{id_of, CrudController};
use crate::sql::{bind_all, delete, insert, select_by_id, update, QueryBuf, SelectQuery, DEFAULT_LIMIT};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashMap};

pub struct SqlCrudController {
    pool: PgPool,
    config: ResourceConfig,
    filters: FilterRegistry<SelectQuery>,
}

/// Split `filter[<field>][type]` / `filter[<field>][value]` params into descriptors per field.
pub fn parse_filter_params(params: &HashMap<String, String>) -> BTreeMap<String, FilterDescriptor> {
    let mut out: BTreeMap<String, FilterDescriptor> = BTreeMap::new();
    for (k, v) in params {
        let Some(rest) = k.strip_prefix("filter[") else { continue };
        let Some((field, part)) = rest.split_once("][") else { continue };
        let Some(part) = part.strip_suffix(']') else { continue };
        let entry = out.entry(field.to_string()).or_default();
        match part {
            "type" => entry.kind = v.clone(),
            "value" => entry.value = v.clone(),
            _ => {}
        }
    }
    out
}

fn number_param(params: &HashMap<String, String>, key: &str, default: u32) -> Result<u32, AppError> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer, got '{}'", key, v))),
    }
}

impl SqlCrudController {
    pub fn new(pool: PgPool, config: ResourceConfig) -> Self {
        SqlCrudController {
            pool,
            config,
            filters: FilterRegistry::default(),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Index query: declared filters, then limit (default 100, max 1000) and offset (default 0).
    pub fn list_query(&self, params: &HashMap<String, String>) -> Result<SelectQuery, AppError> {
        let limit = number_param(params, "limit", DEFAULT_LIMIT)?;
        let offset = number_param(params, "offset", 0)?;
        let mut query = SelectQuery::new(&self.config.storage).limit(limit).offset(offset);
        for (field, descriptor) in parse_filter_params(params) {
            let kind = self
                .config
                .filters
                .get(&field)
                .ok_or_else(|| AppError::BadRequest(format!("{} is not filterable", field)))?;
            self.filters.apply(&mut query, kind, &field, &descriptor)?;
        }
        Ok(query)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| r.try_get::<Value, _>("data").map_err(AppError::from))
            .collect()
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<Value, _>("data").map_err(AppError::from))
            .transpose()
    }

    fn not_found(&self, id: &str) -> AppError {
        AppError::NotFound(format!("{} {}", self.config.resource_name, id))
    }
}

#[async_trait]
impl CrudController for SqlCrudController {
    async fn index(&self, _route: &Route, query: &HashMap<String, String>) -> Result<Vec<Value>, AppError> {
        let select = self.list_query(query)?;
        self.fetch_all(&select.build()).await
    }

    async fn show(&self, _route: &Route, id: &str) -> Result<Value, AppError> {
        let q = select_by_id(&self.config.storage, id);
        self.fetch_optional(&q).await?.ok_or_else(|| self.not_found(id))
    }

    async fn create(&self, _route: &Route, body: Map<String, Value>) -> Result<Value, AppError> {
        let q = insert(&self.config.storage, &body);
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, _route: &Route, id: &str, body: Map<String, Value>) -> Result<Value, AppError> {
        let q = update(&self.config.storage, id, &body);
        self.fetch_optional(&q).await?.ok_or_else(|| self.not_found(id))
    }

    async fn delete(&self, _route: &Route, id: &str) -> Result<(), AppError> {
        let q = delete(&self.config.storage, id);
        self.fetch_optional(&q).await?.ok_or_else(|| self.not_found(id))?;
        Ok(())
    }

    fn row_id(&self, row: &Value) -> Option<String> {
        id_of(row, &self.config.storage.id_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_resource;
    use crate::error::FilterError;
    use crate::sql::BindValue;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn controller() -> SqlCrudController {
        let config = parse_resource(
            "resource_name: city\nbase_name: app\nid_column: code\nfilters:\n  name: string\n  country: string\n",
        )
        .unwrap();
        // Lazy pool: never connects unless a query runs.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        SqlCrudController::new(pool, config)
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_bracketed_filter_params() {
        let parsed = parse_filter_params(&params(&[
            ("filter[name][type]", "contains"),
            ("filter[name][value]", "ar"),
            ("filter[country][value]", ""),
            ("limit", "10"),
            ("filter[broken", "x"),
        ]));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["name"], FilterDescriptor::new("contains", "ar"));
        assert_eq!(parsed["country"], FilterDescriptor::new("", ""));
    }

    #[tokio::test]
    async fn list_query_applies_declared_filters() {
        let c = controller();
        let q = c
            .list_query(&params(&[
                ("filter[name][type]", "contains"),
                ("filter[name][value]", "ar"),
                ("filter[country][type]", "equal"),
                ("filter[country][value]", ""),
                ("limit", "5"),
            ]))
            .unwrap();
        let rendered: Vec<String> = q.predicates().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["name LIKE '%ar%'"]);
        let built = q.build();
        assert!(built.sql.contains("ORDER BY \"code\" LIMIT 5 OFFSET 0"));
        assert_eq!(built.params, vec![BindValue::Text("%ar%".into())]);
    }

    #[tokio::test]
    async fn list_query_rejects_malformed_paging() {
        let c = controller();
        for (key, value) in [("limit", "abc"), ("offset", "-1"), ("limit", "")] {
            let err = c.list_query(&params(&[(key, value)])).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(m) if m.starts_with(key)));
        }
        let built = c.list_query(&params(&[("limit", "5000")])).unwrap().build();
        assert!(built.sql.contains("LIMIT 1000 OFFSET 0"));
    }

    #[tokio::test]
    async fn list_query_rejects_undeclared_fields() {
        let c = controller();
        let err = c
            .list_query(&params(&[("filter[population][type]", "equal"), ("filter[population][value]", "1")]))
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn list_query_surfaces_unknown_filter_type() {
        let c = controller();
        let err = c
            .list_query(&params(&[("filter[name][type]", "regex"), ("filter[name][value]", "^P")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Filter(FilterError::UnsupportedFilterType(t)) if t == "regex"
        ));
    }

    #[tokio::test]
    async fn row_id_uses_configured_column() {
        let c = controller();
        assert_eq!(c.row_id(&json!({"code": "LYS", "id": 4})), Some("LYS".into()));
        assert_eq!(c.row_id(&json!({"id": 4})), None);
    }
}
