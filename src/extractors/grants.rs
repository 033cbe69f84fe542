//! Extract granted permissions from the request (`x-crud-grants` header).

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Header listing grants as comma separated `resource:action` pairs; `*` matches any part.
pub const GRANTS_HEADER: &str = "x-crud-grants";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grants(pub Vec<String>);

impl Grants {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let grants = headers
            .get_all(GRANTS_HEADER)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|s| s.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Grants(grants)
    }

    pub fn allows(&self, resource_name: &str, action: &str) -> bool {
        self.0.iter().any(|g| {
            let (res, act) = g.split_once(':').unwrap_or((g.as_str(), "*"));
            (res == "*" || res == resource_name) && (act == "*" || act == action)
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Grants
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Grants::from_headers(&parts.headers))
    }
}
