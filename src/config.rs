use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Controls error verbosity: full detail in development, sanitized
/// messages in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(RunMode::Development),
            "production" => Ok(RunMode::Production),
            other => Err(Error::Config(format!("Unknown run mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub run_mode: RunMode,
    pub jwt_secret: String,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub email: EmailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: get_env("DATABASE_URL")?,
            run_mode: env::var("RUN_MODE")
                .unwrap_or_else(|_| "development".to_string())
                .parse()?,
            jwt_secret: get_env("JWT_SECRET")?,
            rate_limit_max: get_env_parse_or("RATE_LIMIT_MAX", 100)?,
            rate_limit_window_secs: get_env_parse_or("RATE_LIMIT_WINDOW_SECS", 3600)?,
            email: EmailConfig {
                host: get_env("EMAIL_HOST")?,
                port: get_env_parse("EMAIL_PORT")?,
                username: get_env("EMAIL_USERNAME")?,
                password: get_env("EMAIL_PASSWORD")?,
                from: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "Admin <hello@example.com>".to_string()),
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

static RUN_MODE: OnceLock<RunMode> = OnceLock::new();

/// Installs the run mode consulted by the error responder. Later calls are
/// ignored.
pub fn install_run_mode(mode: RunMode) {
    let _ = RUN_MODE.set(mode);
}

pub fn run_mode() -> RunMode {
    RUN_MODE.get().copied().unwrap_or(RunMode::Development)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_parses_known_values() {
        assert_eq!(
            "development".parse::<RunMode>().unwrap(),
            RunMode::Development
        );
        assert_eq!(
            "production".parse::<RunMode>().unwrap(),
            RunMode::Production
        );
        assert!("staging".parse::<RunMode>().is_err());
    }
}
