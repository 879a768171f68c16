//! Request authentication for the cart and order endpoints.
//!
//! Tokens are HS256 JWTs carrying the user's id, email and role. They are
//! read from the `jwt` cookie first and from an `Authorization: Bearer`
//! header second.

use actix_web::http::header;
use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_COOKIE: &str = "jwt";
pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: u64,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    user: UserData,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("can't get jwt token from cookie")]
    MissingToken,
    #[error("invalid jwt token: {0}")]
    InvalidToken(String),
    #[error("you don't have enough rights to do that action")]
    Forbidden,
    #[error("wrong user id value")]
    InvalidUserId,
    #[error("error signing jwt token: {0}")]
    Signing(String),
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, req: &HttpRequest) -> Result<UserData, AuthError>;
}

/// Authenticates the request and requires one of `roles`.
pub fn authorize(
    authenticator: &dyn Authenticator,
    req: &HttpRequest,
    roles: &[&str],
) -> Result<UserData, AuthError> {
    let user = authenticator.authenticate(req)?;

    if !roles.iter().any(|role| *role == user.role) {
        log::warn!("user {} with role '{}' denied", user.id, user.role);
        return Err(AuthError::Forbidden);
    }
    if user.id == 0 {
        return Err(AuthError::InvalidUserId);
    }

    Ok(user)
}

pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &UserData) -> Result<String, AuthError> {
        let claims = Claims {
            user: user.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn token(req: &HttpRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
            return Some(cookie.value().to_string());
        }
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, req: &HttpRequest) -> Result<UserData, AuthError> {
        let token = Self::token(req).ok_or(AuthError::MissingToken)?;
        let data = decode::<Claims>(&token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                log::debug!("rejected jwt token: {}", e);
                AuthError::InvalidToken(e.to_string())
            })?;

        Ok(data.claims.user)
    }
}
