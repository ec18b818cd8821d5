use std::collections::HashSet;
use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::WebError;

/// The authenticated caller, injected by the surrounding app as an
/// `X-User-Id` header. This engine never authenticates anyone itself.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(WebError::Unauthorized)?;

        Ok(Self(user_id))
    }
}

/// Anonymous-ballot metadata forwarded with the request.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub fingerprint: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let ip = header("x-forwarded-for")
            .map(|forwarded| forwarded.split(',').next().unwrap_or("").trim().to_string())
            .filter(|ip| !ip.is_empty());

        Ok(Self {
            ip,
            fingerprint: header("x-voter-fingerprint"),
        })
    }
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Marker extractor for admin-only operations: requires a bearer API key
/// from the configured set.
pub struct AdminKey;

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminKey
where
    S: Send + Sync,
    ApiKeys: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api_keys = ApiKeys::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(WebError::Unauthorized)?;

        if api_keys.is_valid(token) {
            Ok(Self)
        } else {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}
