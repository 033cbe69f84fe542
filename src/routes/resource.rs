//! Mount a compiled route set on an axum router.
//! Every method reaches the handler; the handler decides per action what a method means.

use crate::handlers::{collection, item};
use crate::routing::ID_PLACEHOLDER;
use crate::state::AppState;
use axum::{routing::any, Extension, Router};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// `article/{id}/edit` -> `/article/:id/edit`
pub fn axum_path(pattern: &str) -> String {
    format!("/{}", pattern.replace(ID_PLACEHOLDER, ":id"))
}

pub fn resource_router(state: AppState) -> Router {
    let mut router = Router::new();
    for route in state.routes.iter() {
        let path = axum_path(&route.path);
        let handler = if route.requires_id() { any(item) } else { any(collection) };
        tracing::debug!(name = %route.name, path = %path, "mounting route");
        router = router.route(&path, handler.layer(Extension(Arc::new(route.clone()))));
    }
    router
        .layer(RequestBodyLimitLayer::new(DEFAULT_BODY_LIMIT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_resource, ResourceLoader};
    use crate::error::AppError;
    use crate::extractors::GRANTS_HEADER;
    use crate::routing::{compile, Route};
    use crate::service::{CrudController, HeaderGrants};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Rows kept in memory; ids are positions + 1.
    #[derive(Default)]
    struct MemoryController {
        rows: Mutex<Vec<Value>>,
        last_query: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CrudController for MemoryController {
        async fn index(&self, _route: &Route, query: &HashMap<String, String>) -> Result<Vec<Value>, AppError> {
            *self.last_query.lock().unwrap() = query.clone();
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn show(&self, _route: &Route, id: &str) -> Result<Value, AppError> {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .find(|r| r["id"].to_string() == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(id.to_string()))
        }

        async fn create(&self, _route: &Route, mut body: Map<String, Value>) -> Result<Value, AppError> {
            let mut rows = self.rows.lock().unwrap();
            body.insert("id".into(), json!(rows.len() + 1));
            rows.push(Value::Object(body));
            Ok(rows[rows.len() - 1].clone())
        }

        async fn update(&self, _route: &Route, id: &str, body: Map<String, Value>) -> Result<Value, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r["id"].to_string() == id)
                .ok_or_else(|| AppError::NotFound(id.to_string()))?;
            for (k, v) in body {
                row[k.as_str()] = v;
            }
            Ok(row.clone())
        }

        async fn delete(&self, _route: &Route, id: &str) -> Result<(), AppError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r["id"].to_string() != id);
            if rows.len() == before {
                return Err(AppError::NotFound(id.to_string()));
            }
            Ok(())
        }
    }

    fn app(yaml: &str) -> (Router, Arc<MemoryController>) {
        let config = parse_resource(yaml).unwrap();
        let controller = Arc::new(MemoryController::default());
        let state = AppState::new(compile(&config).unwrap())
            .with_controller(config.base_name.clone(), config.resource_name.clone(), controller.clone())
            .unwrap()
            .with_access(Arc::new(HeaderGrants));
        (resource_router(state), controller)
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let res = router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const ARTICLE: &str = "resource_name: article\nbase_name: app\ntemplates: admin/article\nredirect_after_create: show\n";

    #[test]
    fn translates_placeholders() {
        assert_eq!(axum_path("article"), "/article");
        assert_eq!(axum_path("article/{id}/edit"), "/article/:id/edit");
    }

    #[tokio::test]
    async fn index_returns_rows_with_route_meta() {
        let (router, controller) = app(ARTICLE);
        controller.rows.lock().unwrap().push(json!({"id": 1, "title": "Hello"}));

        let (status, _, body) = send(&router, get("/article?filter%5Btitle%5D%5Btype%5D=contains")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([{"id": 1, "title": "Hello"}]));
        assert_eq!(body["meta"]["route"], "app_article_index");
        assert_eq!(body["meta"]["template"], "admin/article/index.html.twig");
        assert_eq!(body["meta"]["count"], 1);
        assert_eq!(
            controller.last_query.lock().unwrap().get("filter[title][type]").map(String::as_str),
            Some("contains")
        );
    }

    #[tokio::test]
    async fn create_redirects_to_configured_route() {
        let (router, _) = app(ARTICLE);
        let (status, headers, _) = send(&router, post("/article/new", json!({"title": "Hi"}))).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/article/1");

        let (status, _, body) = send(&router, get("/article/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Hi");
    }

    #[tokio::test]
    async fn update_without_redirect_returns_row() {
        let (router, controller) = app(ARTICLE);
        controller.rows.lock().unwrap().push(json!({"id": 1, "title": "Old"}));

        let (status, _, body) = send(&router, post("/article/1/edit", json!({"title": "New"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "New");
        assert_eq!(body["meta"]["page_name"], "app.article.update");
    }

    #[tokio::test]
    async fn delete_needs_a_write_method() {
        let (router, controller) = app(ARTICLE);
        controller.rows.lock().unwrap().push(json!({"id": 1}));

        let (status, _, _) = send(&router, get("/article/1/delete")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _, _) = send(&router, post("/article/1/delete", Value::Null)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(controller.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_row_is_404() {
        let (router, _) = app(ARTICLE);
        let (status, _, body) = send(&router, get("/article/9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn disabled_actions_are_not_mounted() {
        let (router, _) = app("resource_name: article\nbase_name: app\nonly: [index]\n");
        let (status, _, _) = send(&router, get("/article/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn permission_is_enforced() {
        let (router, _) = app("resource_name: article\nbase_name: app\npermission: true\n");
        let (status, _, body) = send(&router, get("/article")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "forbidden");

        let req = Request::get("/article")
            .header(GRANTS_HEADER, "article:index")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn shared_resource_name_keeps_its_own_controller() {
        let manifest = r#"
app:
  type: crud.resource
  resource: { resource_name: article, base_name: app }
admin:
  type: crud.resource
  prefix: /admin
  resource: { resource_name: article, base_name: admin }
"#;
        let loaded = ResourceLoader::new()
            .load_manifest_str(manifest, std::path::Path::new("."))
            .await
            .unwrap();
        let app_rows = Arc::new(MemoryController::default());
        let admin_rows = Arc::new(MemoryController::default());
        app_rows.rows.lock().unwrap().push(json!({"id": 1, "title": "public"}));
        admin_rows.rows.lock().unwrap().push(json!({"id": 1, "title": "draft"}));
        let state = AppState::new(loaded.routes)
            .with_controller("app", "article", app_rows)
            .unwrap()
            .with_controller("admin", "article", admin_rows)
            .unwrap();
        let router = resource_router(state);

        let (_, _, body) = send(&router, get("/article/1")).await;
        assert_eq!(body["data"]["title"], "public");
        let (_, _, body) = send(&router, get("/admin/article/1")).await;
        assert_eq!(body["data"]["title"], "draft");
        assert_eq!(body["meta"]["route"], "admin_article_show");
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let (router, _) = app(ARTICLE);
        let (status, _, _) = send(&router, post("/article/new", json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
