//! Session tokens.
//!
//! Users authenticate with an HS256 JWT whose `sub` claim is their login. The token can arrive either as an
//! `Authorization: Bearer <jwt>` header or as a `Token` cookie. Any handler that takes a [`JwtClaims`] argument is
//! protected: requests without a valid, unexpired token are rejected with `401 Unauthorized` before the handler runs.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const TOKEN_COOKIE: &str = "Token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user's login
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn user(&self) -> &str {
        self.sub.as_str()
    }
}

/// Mints and checks session tokens. Registered as app data so that the [`JwtClaims`] extractor can find it.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let ttl = chrono::Duration::from_std(config.token_ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue_token(&self, user: &str) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = JwtClaims { sub: user.to_string(), iat: now.timestamp(), exp: (now + self.ttl).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::ValidationError("The token does not name a user".to_string()));
        }
        Ok(data.claims)
    }
}

/// Pulls the raw token out of the `Authorization` header, falling back to the session cookie.
fn token_from_request(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    bearer.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<TokenIssuer>>() {
            None => {
                error!("💻️ No TokenIssuer has been configured. Cannot authenticate {}", req.path());
                Err(ServerError::ConfigurationError("Authentication is not configured".to_string()))
            },
            Some(issuer) => match token_from_request(req) {
                None => Err(ServerError::AuthenticationError(AuthError::MissingToken)),
                Some(token) => issuer.validate(&token).map_err(|e| {
                    debug!("💻️ Rejected session token for {}. {e}", req.path());
                    ServerError::AuthenticationError(e)
                }),
            },
        };
        ready(result)
    }
}
