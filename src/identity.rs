use std::future::{ready, Ready};

use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::{Duration, Utc};
use diesel::SqliteConnection;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    errors::AppError,
    models::setting::{self, NewSetting, Setting},
};

const JWT_SECRET_KEY: &str = "jwt_secret";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("identity resolver not configured")]
    NotConfigured,
}

/// Claims issued by the gateway
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: usize,
}

/// Turns a request credential into a verified user id.
pub trait IdentityResolver: Send + Sync {
    fn resolve_user_id(&self, credential: &str) -> Result<i64, AuthError>;
}

/// HMAC-signed JWT bearer tokens (HS256/384/512).
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve_user_id(&self, credential: &str) -> Result<i64, AuthError> {
        let token = credential.trim().trim_start_matches("Bearer ").trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.user_id)
    }
}

/// Sign a token the resolver accepts. Used for local development.
pub fn issue_token(
    secret: &str,
    user_id: i64,
    valid_for: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + valid_for).timestamp().max(0) as usize;
    let claims = Claims {
        user_id,
        role: Some("user".to_string()),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Use the configured secret, else the one persisted in `settings`,
/// generating and storing it on first start.
pub fn load_or_create_secret(
    conn: &mut SqliteConnection,
    configured: Option<&str>,
) -> Result<String, setting::Error> {
    if let Some(secret) = configured.filter(|s| !s.is_empty()) {
        return Ok(secret.to_string());
    }

    match Setting::get(conn, JWT_SECRET_KEY, None) {
        Ok(found) => return Ok(found.value),
        Err(setting::Error::SettingNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    log::info!("No JWT secret configured, generating one");
    let new_secret = NewSetting {
        user_id: None,
        key: JWT_SECRET_KEY.to_string(),
        value: generate_secret(),
    };
    Setting::add(conn, &new_secret).map(|s| s.value)
}

fn generate_secret() -> String {
    use rand::distributions::Alphanumeric;
    use rand::{rngs::OsRng, Rng};

    OsRng
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verified caller identity, extracted from `Authorization: Bearer ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let resolver = match req.app_data::<web::Data<dyn IdentityResolver>>() {
            Some(resolver) => resolver.clone(),
            None => {
                log::error!("Identity resolver missing from app data");
                return ready(Err(AuthError::NotConfigured.into()));
            }
        };

        let bearer = match BearerAuth::extract(req).into_inner() {
            Ok(auth) => auth,
            Err(_) => return ready(Err(AuthError::MissingCredential.into())),
        };

        match resolver.resolve_user_id(bearer.token()) {
            Ok(user_id) => ready(Ok(AuthenticatedUser { user_id })),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected bearer credential");
                ready(Err(e.into()))
            }
        }
    }
}
