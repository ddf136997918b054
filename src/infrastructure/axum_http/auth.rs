use std::sync::Arc;

use anyhow::Result;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    application::usecases::error::UseCaseError, config::config_model::Session,
    domain::value_objects::enums::roles::Role,
};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Signing material for session tokens, shared with handlers as an
/// `Extension<Arc<SessionKeys>>`.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_minutes: i64, cookie_secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
            cookie_secure,
        }
    }

    pub fn from_config(session: &Session) -> Self {
        Self::new(&session.secret, session.ttl_minutes, session.cookie_secure)
    }

    /// `role` is informational; authorization re-derives it on every request.
    pub fn sign(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(%user_id, "session: token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    /// Expired replacement for the session cookie; added, not removed, so the
    /// browser always receives it.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
        cookie.make_removal();
        cookie
    }
}

/// Request-scoped authentication context taken from the session cookie or a
/// bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_role: Role,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = UseCaseError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<SessionKeys>>()
            .cloned()
            .ok_or_else(|| {
                UseCaseError::Internal(anyhow::anyhow!("session keys are not installed"))
            })?;

        let token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| bearer_token(parts))
            .ok_or(UseCaseError::Unauthenticated)?;

        let claims = keys.verify(&token).map_err(|err| {
            warn!(error = %err, "session: invalid or expired token");
            UseCaseError::Unauthenticated
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            session_role: claims.role,
        })
    }
}
