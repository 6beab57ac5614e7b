//! Identity for incoming requests.
//!
//! Users log in through a separate service, which hands out an HS256-signed JWT carrying the account id and role. The
//! same shared secret is configured here. [`TokenVerifier`] checks the signature and expiry, and the JWT middleware
//! stores the resulting [`JwtClaims`] in the request extensions, where handlers pick them up as an extractor.
use std::future::{ready, Ready};

use actix_web::{
    dev::{Payload, ServiceRequest},
    http::header::AUTHORIZATION,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use storefront_engine::db_types::Role;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// Name of the cookie the login service stores the access token in.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenPayload {
    id: i64,
    role: Role,
    exp: i64,
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

/// Signs access tokens. Used by the login service and by tests.
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Issue a new access token for the given claims. Tokens are valid for a day unless `duration` says otherwise.
    /// This method DOES NOT check that the claims describe a real account.
    pub fn issue_token(&self, claims: JwtClaims, duration: Option<Duration>) -> Result<String, AuthError> {
        let exp = Utc::now() + duration.unwrap_or_else(|| Duration::hours(24));
        let payload = TokenPayload { id: claims.id, role: claims.role, exp: exp.timestamp() };
        encode(&Header::new(Algorithm::HS256), &payload, &self.key).map_err(|e| AuthError::TokenSigning(e.to_string()))
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<TokenPayload>(token, &self.key, &self.validation).map_err(|e| {
            debug!("💻️ Access token rejected. {e}");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        let TokenPayload { id, role, .. } = data.claims;
        Ok(JwtClaims { id, role })
    }
}

/// Pulls the raw access token from the `token` cookie, falling back to an `Authorization: Bearer` header.
pub fn token_from_request(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
