use crate::utils::ConfigError;
use std::env;
use std::str::FromStr;

const DEFAULT_DATABASE: &str = "finaxial";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24 * 30;
const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongodb_uri = mongodb_uri_from_env()?;
        let database_name = database_name_from_env(&mongodb_uri);

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
            mongodb_uri,
            database_name,
            jwt_secret,
            jwt_expiration_hours: jwt_expiration_hours(env::var("JWT_EXPIRATION_HOURS").ok())?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `MONGODB_URI`, falling back to `MONGO_URI`.
pub fn mongodb_uri_from_env() -> Result<String, ConfigError> {
    env::var("MONGODB_URI")
        .or_else(|_| env::var("MONGO_URI"))
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing("MONGODB_URI"))
}

/// `MONGODB_DATABASE`, else the database named in the URI path.
pub fn database_name_from_env(uri: &str) -> String {
    env::var("MONGODB_DATABASE")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| database_name_from_uri(uri))
}

/// Database name from the URI path, e.g. `mongodb+srv://host/finaxial?retryWrites=true`.
pub fn database_name_from_uri(uri: &str) -> String {
    uri.split("://")
        .nth(1)
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DATABASE)
        .to_string()
}

/// Token lifetime in hours, between 1 hour and one year.
fn jwt_expiration_hours(raw: Option<String>) -> Result<i64, ConfigError> {
    let hours = parse_value("JWT_EXPIRATION_HOURS", raw.clone(), DEFAULT_JWT_EXPIRATION_HOURS)?;
    if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid {
            name: "JWT_EXPIRATION_HOURS",
            value: raw.unwrap_or_default(),
        });
    }
    Ok(hours)
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    parse_value(name, env::var(name).ok(), default)
}

fn parse_value<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}
