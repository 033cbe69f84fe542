pub mod grants;

pub use grants::{Grants, GRANTS_HEADER};
