use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::AdminStore;
use crate::models::AdminUser;
use crate::utils::{AppError, AppResult};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // admin username
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Signing settings shared by the `/token` handler and the auth middleware.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    secret: String,
    ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> AppResult<Self> {
        let ttl = Duration::try_hours(ttl_hours)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| AppError::Config(format!("Invalid token lifetime: {}h", ttl_hours)))?;

        Ok(Self {
            secret: secret.into(),
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        Self::new(config.jwt_secret.clone(), config.token_ttl_hours)
    }
}

pub fn generate_jwt(settings: &TokenSettings, username: &str) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + settings.ttl).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

pub fn verify_token(settings: &TokenSettings, token: &str) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

pub async fn login(
    admins: &dyn AdminStore,
    settings: &TokenSettings,
    request: &TokenRequest,
) -> AppResult<TokenResponse> {
    let invalid = || AppError::Unauthorized("Incorrect username or password".into());

    let admin = admins.find_admin(&request.username).await?.ok_or_else(invalid)?;

    if !verify(&request.password, &admin.password_hash)? {
        return Err(invalid());
    }

    Ok(TokenResponse {
        access_token: generate_jwt(settings, &admin.username)?,
        token_type: "bearer".to_string(),
    })
}

/// Creates the admin account unless it already exists.
pub async fn ensure_admin(
    admins: &dyn AdminStore,
    username: &str,
    password: &str,
    cost: u32,
) -> AppResult<bool> {
    if admins.find_admin(username).await?.is_some() {
        return Ok(false);
    }

    let admin = AdminUser {
        username: username.to_string(),
        password_hash: hash(password, cost)?,
    };
    admins.insert_admin(&admin).await
}

/// Bootstraps the admin account from configuration, if one is configured.
pub async fn bootstrap_admin(admins: &dyn AdminStore, config: &AuthConfig) -> AppResult<()> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        if config.enabled {
            log::warn!("⚠️  Auth enabled but ADMIN_USERNAME/ADMIN_PASSWORD not set");
        }
        return Ok(());
    };

    if ensure_admin(admins, username, password, DEFAULT_COST).await? {
        log::info!("👤 Admin account '{}' created", username);
    }
    Ok(())
}
