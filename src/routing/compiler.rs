//! Resource config -> named routes, one per enabled action.

use crate::config::{Action, ResourceConfig};
use crate::error::ConfigError;
use crate::routing::{PermissionMeta, Route, RouteMeta, RouteSet};
use serde_json::{Map, Value};

/// `{base}_{resource}_{action}`
pub fn route_name(config: &ResourceConfig, action: Action) -> String {
    format!("{}_{}_{}", config.base_name, config.resource_name, action)
}

/// `{base}.{resource}.{action}`
pub fn page_name(config: &ResourceConfig, action: Action) -> String {
    format!("{}.{}.{}", config.base_name, config.resource_name, action)
}

/// `{base}.controller.{resource}::{action}Action`
pub fn controller_ref(config: &ResourceConfig, action: Action) -> String {
    format!(
        "{}.controller.{}::{}Action",
        config.base_name, config.resource_name, action
    )
}

pub fn path_pattern(resource_name: &str, action: Action) -> String {
    match action {
        Action::Index => resource_name.to_string(),
        Action::Create => format!("{}/new", resource_name),
        Action::Show => format!("{}/{{id}}", resource_name),
        Action::Update => format!("{}/{{id}}/edit", resource_name),
        Action::Delete => format!("{}/{{id}}/delete", resource_name),
    }
}

fn template(config: &ResourceConfig, action: Action) -> Option<String> {
    let root = config.templates.as_deref()?;
    action
        .has_view()
        .then(|| format!("{}/{}.html.twig", root, action))
}

fn redirect(config: &ResourceConfig, action: Action) -> Option<String> {
    let target = match action {
        Action::Create => config.redirect_after_create,
        Action::Update => config.redirect_after_update,
        _ => None,
    }?;
    Some(route_name(config, target))
}

fn vars(config: &ResourceConfig, action: Action, page_name: &str) -> Map<String, Value> {
    let mut vars = Map::new();
    vars.insert("page_name".into(), Value::String(page_name.to_string()));
    for (k, v) in &config.vars.global {
        vars.insert(k.clone(), v.clone());
    }
    if let Some(scoped) = config.vars.for_action(action) {
        for (k, v) in scoped {
            vars.insert(k.clone(), v.clone());
        }
    }
    vars
}

pub fn build_route(config: &ResourceConfig, action: Action) -> Route {
    let page_name = page_name(config, action);
    let meta = RouteMeta {
        template: template(config, action),
        redirect: redirect(config, action),
        vars: vars(config, action, &page_name),
        permission: config.permission.then(|| PermissionMeta {
            resource_name: config.resource_name.clone(),
        }),
        page_name,
    };
    Route {
        name: route_name(config, action),
        base: config.base_name.clone(),
        resource: config.resource_name.clone(),
        action,
        path: path_pattern(&config.resource_name, action),
        controller: controller_ref(config, action),
        meta,
    }
}

/// Compile a validated config into its route set.
pub fn compile(config: &ResourceConfig) -> Result<RouteSet, ConfigError> {
    if config.resource_name.is_empty() {
        return Err(ConfigError::MissingResourceName);
    }
    if config.base_name.is_empty() {
        return Err(ConfigError::MissingBaseName);
    }
    let mut routes = RouteSet::new();
    for action in config.enabled_actions() {
        let route = build_route(config, action);
        tracing::debug!(name = %route.name, path = %route.path, controller = %route.controller, "compiled route");
        routes.add(route)?;
    }
    for route in &routes {
        if let Some(target) = &route.meta.redirect {
            if routes.get(target).is_none() {
                return Err(ConfigError::UnknownRedirectTarget {
                    route: route.name.clone(),
                    target: target.clone(),
                });
            }
        }
    }
    Ok(routes)
}
