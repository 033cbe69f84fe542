//! Compiled routes and the ordered set that owns them.

use crate::config::Action;
use crate::error::ConfigError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Placeholder for the row id in path patterns.
pub const ID_PLACEHOLDER: &str = "{id}";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PermissionMeta {
    pub resource_name: String,
}

/// Per-route data handed to the controller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteMeta {
    pub page_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Always contains `page_name`; then global vars, then per-action vars.
    pub vars: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionMeta>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub name: String,
    pub base: String,
    pub resource: String,
    pub action: Action,
    /// Relative pattern, e.g. `article/{id}/edit`.
    pub path: String,
    /// `{base}.controller.{resource}::{action}Action`
    pub controller: String,
    pub meta: RouteMeta,
}

impl Route {
    pub fn requires_id(&self) -> bool {
        self.path.contains(ID_PLACEHOLDER)
    }

    /// `(base, resource)`: the config this route was compiled from.
    pub fn resource_key(&self) -> (&str, &str) {
        (&self.base, &self.resource)
    }
}

/// Routes keyed by unique name and unique path, iterated in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteSet {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
}

impl RouteSet {
    pub fn new() -> Self {
        RouteSet::default()
    }

    pub fn add(&mut self, route: Route) -> Result<(), ConfigError> {
        self.check(&route)?;
        self.by_name.insert(route.name.clone(), self.routes.len());
        self.by_path.insert(route.path.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    fn check(&self, route: &Route) -> Result<(), ConfigError> {
        if self.by_name.contains_key(&route.name) {
            return Err(ConfigError::DuplicateRouteName(route.name.clone()));
        }
        if let Some(&i) = self.by_path.get(&route.path) {
            return Err(ConfigError::DuplicateRoutePath {
                path: route.path.clone(),
                route: route.name.clone(),
                existing: self.routes[i].name.clone(),
            });
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Append all routes of `other`. Nothing is added if any name or path collides.
    pub fn merge(&mut self, other: RouteSet) -> Result<(), ConfigError> {
        for route in &other.routes {
            self.check(route)?;
        }
        for route in other.routes {
            self.add(route)?;
        }
        Ok(())
    }

    /// Prepend `prefix` to every path. Leading and trailing slashes are ignored.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return self;
        }
        self.by_path.clear();
        for (i, route) in self.routes.iter_mut().enumerate() {
            route.path = if route.path.is_empty() {
                prefix.to_string()
            } else {
                format!("{}/{}", prefix, route.path)
            };
            self.by_path.insert(route.path.clone(), i);
        }
        self
    }

    /// Absolute URL for a named route, substituting `id` when the path needs one.
    pub fn url_for(&self, name: &str, id: Option<&str>) -> Result<String, ConfigError> {
        let route = self.get(name).ok_or_else(|| ConfigError::UnknownRoute(name.to_string()))?;
        let path = if route.requires_id() {
            let id = id.ok_or_else(|| ConfigError::MissingRouteParameter(name.to_string()))?;
            route.path.replace(ID_PLACEHOLDER, id)
        } else {
            route.path.clone()
        };
        Ok(format!("/{}", path))
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
