//! Handlers behind compiled resource routes. The route itself travels as an extension.

use crate::config::Action;
use crate::error::AppError;
use crate::extractors::Grants;
use crate::response::{page, page_many};
use crate::routing::Route;
use crate::service::CrudController;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn body_to_map(bytes: &Bytes) -> Result<Map<String, Value>, AppError> {
    if bytes.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(e) => Err(AppError::BadRequest(format!("invalid JSON body: {}", e))),
    }
}

fn is_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn not_allowed(method: &Method, route: &Route) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
        route: route.name.clone(),
    }
}

fn check_permission(state: &AppState, route: &Route, grants: &Grants) -> Result<(), AppError> {
    if let Some(p) = &route.meta.permission {
        if !state.access.is_granted(route.action, &p.resource_name, grants) {
            return Err(AppError::Forbidden(route.name.clone()));
        }
    }
    Ok(())
}

/// After a successful write: 303 to the configured target, or the row itself.
fn written(
    state: &AppState,
    controller: &dyn CrudController,
    route: &Route,
    row: Value,
    status: StatusCode,
) -> Result<Response, AppError> {
    match &route.meta.redirect {
        Some(target) => {
            let id = controller.row_id(&row);
            let location = state.routes.url_for(target, id.as_deref())?;
            Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
        }
        None => Ok(page(status, route, row).into_response()),
    }
}

async fn dispatch(
    state: AppState,
    route: &Route,
    method: Method,
    grants: Grants,
    id: Option<String>,
    query: HashMap<String, String>,
    body: Bytes,
) -> Result<Response, AppError> {
    check_permission(&state, route, &grants)?;
    let controller = state.controller_for(route)?.clone();
    let id = id.as_deref();
    let missing_id = || AppError::BadRequest(format!("{} requires an id", route.name));

    tracing::debug!(route = %route.name, method = %method, id = ?id, "dispatch");
    match route.action {
        Action::Index if is_read(&method) => {
            let rows = controller.index(route, &query).await?;
            Ok(page_many(route, rows).into_response())
        }
        Action::Show if is_read(&method) => {
            let row = controller.show(route, id.ok_or_else(missing_id)?).await?;
            Ok(page(StatusCode::OK, route, row).into_response())
        }
        Action::Create if is_read(&method) => Ok(page(StatusCode::OK, route, Value::Null).into_response()),
        Action::Create if method == Method::POST || method == Method::PUT => {
            let row = controller.create(route, body_to_map(&body)?).await?;
            written(&state, &*controller, route, row, StatusCode::CREATED)
        }
        Action::Update if is_read(&method) => {
            let row = controller.show(route, id.ok_or_else(missing_id)?).await?;
            Ok(page(StatusCode::OK, route, row).into_response())
        }
        Action::Update if method == Method::POST || method == Method::PUT || method == Method::PATCH => {
            let row = controller
                .update(route, id.ok_or_else(missing_id)?, body_to_map(&body)?)
                .await?;
            written(&state, &*controller, route, row, StatusCode::OK)
        }
        Action::Delete if method == Method::POST || method == Method::DELETE => {
            controller.delete(route, id.ok_or_else(missing_id)?).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(not_allowed(&method, route)),
    }
}

/// Handler for routes without an `{id}` segment (index, create).
pub async fn collection(
    State(state): State<AppState>,
    Extension(route): Extension<Arc<Route>>,
    method: Method,
    grants: Grants,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, AppError> {
    dispatch(state, &route, method, grants, None, query, body).await
}

/// Handler for routes with an `{id}` segment (show, update, delete).
pub async fn item(
    State(state): State<AppState>,
    Extension(route): Extension<Arc<Route>>,
    Path(id): Path<String>,
    method: Method,
    grants: Grants,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, AppError> {
    dispatch(state, &route, method, grants, Some(id), query, body).await
}
