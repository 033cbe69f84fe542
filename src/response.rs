//! Standard response envelope: row data plus the route's page metadata.

use crate::routing::{Route, RouteMeta};
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct PageMeta<'a> {
    pub route: &'a str,
    #[serde(flatten)]
    pub page: &'a RouteMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Serialize)]
pub struct Page<'a, T> {
    pub data: T,
    pub meta: PageMeta<'a>,
}

pub fn page<T: Serialize>(status: StatusCode, route: &Route, data: T) -> (StatusCode, Json<Page<'_, T>>) {
    (
        status,
        Json(Page {
            data,
            meta: PageMeta {
                route: &route.name,
                page: &route.meta,
                count: None,
            },
        }),
    )
}

pub fn page_many<T: Serialize>(route: &Route, data: Vec<T>) -> (StatusCode, Json<Page<'_, Vec<T>>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(Page {
            data,
            meta: PageMeta {
                route: &route.name,
                page: &route.meta,
                count: Some(count),
            },
        }),
    )
}
