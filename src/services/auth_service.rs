use crate::{
    models::{user::normalize_email, User, UserInfo},
    state::AppState,
    utils::{AppError, AppResult},
};
use actix_web::web;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user _id (hex)
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration
    pub jti: String, // JWT ID
}

/// Signing material for session tokens, built once from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_hours: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiration_hours", &self.expiration_hours)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration_hours,
        }
    }

    pub fn expiration_hours(&self) -> i64 {
        self.expiration_hours
    }

    pub fn issue(&self, user_id: &ObjectId) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.expiration_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .filter(|expires_at| expires_at > &now)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Invalid token lifetime: {} hours",
                    self.expiration_hours
                ))
            })?;
        let claims = Claims {
            sub: user_id.to_hex(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }

    #[cfg(test)]
    pub fn encode_claims(&self, claims: &Claims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).unwrap()
    }
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    web::block(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(AppError::from)
}

// User registration
pub async fn register(state: &AppState, request: RegisterRequest) -> AppResult<AuthResponse> {
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let email = normalize_email(&request.email)?;
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(request.password, state.bcrypt_cost).await?;
    let user = User::new(&request.name, &email, password_hash)?;
    state.users.create(&user).await?;

    log::info!("✅ User registered: {}", user.email);

    Ok(AuthResponse {
        success: true,
        token: state.jwt.issue(&user.id)?,
        user: UserInfo::from(&user),
    })
}

// User login
pub async fn login(state: &AppState, request: LoginRequest) -> AppResult<AuthResponse> {
    let email = normalize_email(&request.email).map_err(|_| invalid_credentials())?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let stored = user.password.clone().ok_or_else(invalid_credentials)?;
    if !verify_password(request.password, stored).await? {
        return Err(invalid_credentials());
    }

    Ok(AuthResponse {
        success: true,
        token: state.jwt.issue(&user.id)?,
        user: UserInfo::from(&user),
    })
}
