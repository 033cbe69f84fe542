//! Shared application state for resource routes.

use crate::error::{AppError, ConfigError};
use crate::routing::{Route, RouteSet};
use crate::service::{AccessControl, AllowAll, CrudController};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Built once at startup, read-only afterwards.
    pub routes: Arc<RouteSet>,
    /// Controller per `(base_name, resource_name)`.
    pub controllers: HashMap<(String, String), Arc<dyn CrudController>>,
    pub access: Arc<dyn AccessControl>,
}

impl AppState {
    pub fn new(routes: RouteSet) -> Self {
        AppState {
            routes: Arc::new(routes),
            controllers: HashMap::new(),
            access: Arc::new(AllowAll),
        }
    }

    /// Register the controller for one resource config. Registering the same pair twice is an error.
    pub fn with_controller(
        mut self,
        base_name: impl Into<String>,
        resource_name: impl Into<String>,
        controller: Arc<dyn CrudController>,
    ) -> Result<Self, ConfigError> {
        let key = (base_name.into(), resource_name.into());
        if self.controllers.contains_key(&key) {
            return Err(ConfigError::DuplicateController(format!("{}.{}", key.0, key.1)));
        }
        self.controllers.insert(key, controller);
        Ok(self)
    }

    pub fn with_access(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    pub fn controller_for(&self, route: &Route) -> Result<&Arc<dyn CrudController>, AppError> {
        let (base, resource) = route.resource_key();
        self.controllers
            .get(&(base.to_string(), resource.to_string()))
            .ok_or_else(|| {
                ConfigError::Validation(format!("no controller registered for {}.{}", base, resource)).into()
            })
    }
}
