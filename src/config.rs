//! Process configuration, resolved once at startup from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Development-only signing secret used when `JWT_SECRET` is unset.
///
/// Anyone who reads this file can forge tokens for a deployment that keeps it.
pub const DEV_JWT_SECRET: &str = "ResearchProfilesDevelopmentSecretDoNotUseInProduction";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PROFILES_FILE: &str = "profiles.json";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when JWT_SECRET_REQUIRED is enabled")]
    MissingSecret,
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Who may replace a profile through the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileUpdateAuth {
    /// Any caller may update any profile.
    #[default]
    Open,
    /// The bearer token's subject must equal the profile id.
    Owner,
}

impl FromStr for ProfileUpdateAuth {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "owner" => Ok(Self::Owner),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    /// True when `jwt_secret` is [`DEV_JWT_SECRET`].
    pub using_dev_secret: bool,
    pub profiles_file: PathBuf,
    pub cors_allowed_origin: String,
    pub profile_update_auth: ProfileUpdateAuth,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_required = match var("JWT_SECRET_REQUIRED") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                var: "JWT_SECRET_REQUIRED",
                value,
            })?,
            None => false,
        };

        let (jwt_secret, using_dev_secret) = match var("JWT_SECRET") {
            Some(secret) => (secret.into_bytes(), false),
            None if secret_required => return Err(ConfigError::MissingSecret),
            None => (DEV_JWT_SECRET.as_bytes().to_vec(), true),
        };

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let profile_update_auth = match var("PROFILE_UPDATE_AUTH") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "PROFILE_UPDATE_AUTH",
                value,
            })?,
            None => ProfileUpdateAuth::default(),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret,
            using_dev_secret,
            profiles_file: var("PROFILES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILES_FILE)),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            profile_update_auth,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
