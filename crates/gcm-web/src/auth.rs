//! Bearer-JWT claim extraction at the edge (spec §6 Identity): `sub`,
//! `custom:tenant_id`, `custom:company_id`. An [`AuthenticatedUser`] axum
//! extractor decodes and validates the token before a handler ever runs.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;

use crate::response::ApiError;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "custom:tenant_id")]
    tenant_id: String,
    #[serde(rename = "custom:company_id")]
    company_id: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub tenant_id: String,
    pub company_id: String,
}

impl AuthenticatedUser {
    /// Spec §8 access-isolation invariant: a key not scoped under the
    /// caller's own company is always rejected.
    pub fn require_scoped(&self, key: &str) -> Result<(), ApiError> {
        if key.starts_with(&format!("tenants/{}/", self.company_id)) {
            Ok(())
        } else {
            Err(ApiError::AccessDenied)
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let header = parts.headers.get(axum::http::header::AUTHORIZATION).ok_or(ApiError::AccessDenied)?;
        let value = header.to_str().map_err(|_| ApiError::AccessDenied)?;
        let token = value.strip_prefix("Bearer ").ok_or(ApiError::AccessDenied)?;

        let validation = Validation::new(Algorithm::HS256);
        let key = DecodingKey::from_secret(app_state.jwt_secret.as_bytes());
        let decoded = jsonwebtoken::decode::<Claims>(token, &key, &validation).map_err(|_| ApiError::AccessDenied)?;

        Ok(AuthenticatedUser { user_id: decoded.claims.sub, tenant_id: decoded.claims.tenant_id, company_id: decoded.claims.company_id })
    }
}
