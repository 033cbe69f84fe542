//! CRUD SDK: REST-style routes and query filters from declarative resource config.

pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod routing;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{parse_resource, Action, LoadedResources, ResourceConfig, ResourceLoader};
pub use error::{AppError, ConfigError, FilterError};
pub use filter::{Filter, FilterDescriptor, FilterRegistry, FilterType, QueryBuilder, StringFilter};
pub use routes::{common_routes, resource_router};
pub use routing::{compile, Route, RouteMeta, RouteSet};
pub use service::{AccessControl, AllowAll, CrudController, HeaderGrants, SqlCrudController};
pub use sql::SelectQuery;
pub use state::AppState;
