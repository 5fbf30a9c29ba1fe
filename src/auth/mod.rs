//! Token issuance and verification. Access and refresh tokens are separate
//! JWTs with their own secrets and lifetimes; handlers receive the verified
//! identity through the [`AuthUser`] extractor.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
            access_ttl: Duration::minutes(settings.access_ttl_minutes),
            refresh_ttl: Duration::days(settings.refresh_ttl_days),
        }
    }

    fn issue(&self, user: Uuid, key: &EncodingKey, ttl: Duration) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user.to_string(),
            exp: (Utc::now() + ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, key)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<Uuid, ApiError> {
        let data = decode::<Claims>(token, key, &Validation::default())
            .map_err(|_| ApiError::Unauthorized("Invalid access token".into()))?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid access token".into()))
    }

    pub fn issue_access(&self, user: Uuid) -> Result<String, ApiError> {
        self.issue(user, &self.access_encoding, self.access_ttl)
    }

    pub fn issue_refresh(&self, user: Uuid) -> Result<String, ApiError> {
        self.issue(user, &self.refresh_encoding, self.refresh_ttl)
    }

    pub fn verify_access(&self, token: &str) -> Result<Uuid, ApiError> {
        self.verify(token, &self.access_decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, ApiError> {
        self.verify(token, &self.refresh_decoding)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }
    req.cookie("accessToken").map(|c| c.value().to_string())
}

/// Verified identity of the caller. Protected handlers take this by value;
/// optional-identity handlers take `Option<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<TokenIssuer>>() {
            Some(issuer) => match bearer_token(req) {
                Some(token) => issuer.verify_access(&token).map(AuthUser),
                None => Err(ApiError::Unauthorized("Unauthorized request".into())),
            },
            None => Err(ApiError::Internal(anyhow::anyhow!(
                "token issuer not configured"
            ))),
        };
        ready(result)
    }
}
