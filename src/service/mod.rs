//! Controllers behind compiled routes.

mod access;
mod controller;
mod crud;
pub use access::{AccessControl, AllowAll, HeaderGrants};
pub use controller::{id_of, CrudController};
pub use crud::{parse_filter_params, SqlCrudController};
