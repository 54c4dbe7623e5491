use crate::utils::{AppError, AppResult};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 50;

/// User document (collection "users")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// bcrypt hash. Absent when the lookup projected it out.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: BsonDateTime,
}

impl User {
    /// Builds a new user from registration input. `password_hash` must already be hashed.
    pub fn new(name: &str, email: &str, password_hash: String) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please add a name".into()));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Name cannot be more than {} characters",
                NAME_MAX_LEN
            )));
        }

        let now = BsonDateTime::now();
        Ok(Self {
            id: ObjectId::new(),
            name: name.to_string(),
            email: normalize_email(email)?,
            password: Some(password_hash),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn without_password(mut self) -> Self {
        self.password = None;
        self
    }
}

/// Trims and lower-cases an email, rejecting anything without a local part and domain.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("Please add a valid email".into())),
    }
}

/// Public view of a user; never carries the password.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
