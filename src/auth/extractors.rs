use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::{ServiceError, ServiceResult};

/// Identity of the caller, derived from an optional `Authorization: Bearer`
/// header. A missing or invalid token yields an anonymous viewer; protected
/// operations reject it later with `Unauthenticated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer(pub Option<Uuid>);

impl Viewer {
    pub fn user(id: Uuid) -> Self {
        Self(Some(id))
    }

    pub fn require(&self) -> ServiceResult<Uuid> {
        self.0.ok_or(ServiceError::Unauthenticated)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        else {
            return Ok(Viewer(None));
        };

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or(header);

        let keys = JwtKeys::from_ref(state);
        match keys.verify(token) {
            Ok(claims) => Ok(Viewer::user(claims.sub)),
            Err(e) => {
                warn!(error = %e, "invalid or expired token; continuing anonymously");
                Ok(Viewer(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_is_unauthenticated() {
        assert!(matches!(Viewer::default().require(), Err(ServiceError::Unauthenticated)));
    }

    #[test]
    fn authenticated_viewer_yields_id() {
        let id = Uuid::new_v4();
        assert_eq!(Viewer::user(id).require().unwrap(), id);
    }
}
