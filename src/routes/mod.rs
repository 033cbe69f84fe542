mod common;
mod resource;

pub use common::common_routes;
pub use resource::{axum_path, resource_router, DEFAULT_BODY_LIMIT};
