//! Permission checks for routes compiled with `permission: true`.

use crate::config::Action;
use crate::extractors::Grants;

pub trait AccessControl: Send + Sync {
    fn is_granted(&self, action: Action, resource_name: &str, grants: &Grants) -> bool;
}

/// Grants everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AccessControl for AllowAll {
    fn is_granted(&self, _action: Action, _resource_name: &str, _grants: &Grants) -> bool {
        true
    }
}

/// Grants what the request's `x-crud-grants` header lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderGrants;

impl AccessControl for HeaderGrants {
    fn is_granted(&self, action: Action, resource_name: &str, grants: &Grants) -> bool {
        let granted = grants.allows(resource_name, action.as_str());
        if !granted {
            tracing::debug!(resource = %resource_name, action = %action, "permission denied");
        }
        granted
    }
}
