use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub client_url: String,
    pub uploads_dir: String,
    pub auth_rps: u32,
    pub api_rps: u32,
    pub max_companies_per_employer: i64,
    pub otp_ttl_minutes: i64,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub jooble_api_key: Option<String>,
    pub mail_webhook_url: Option<String>,
    pub mail_from: String,
    pub chrome_bin: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expires_hours: get_env_parse_or("JWT_EXPIRES_HOURS", 168)?,
            client_url: get_env_or("CLIENT_URL", "http://localhost:5173"),
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            auth_rps: get_env_parse_or("AUTH_RPS", 10)?,
            api_rps: get_env_parse_or("API_RPS", 100)?,
            max_companies_per_employer: get_env_parse_or("MAX_COMPANIES_PER_EMPLOYER", 5)?,
            otp_ttl_minutes: get_env_parse_or("OTP_TTL_MINUTES", 10)?,
            stripe_secret_key: get_env_opt("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: get_env_opt("STRIPE_WEBHOOK_SECRET"),
            jooble_api_key: get_env_opt("JOOBLE_API_KEY"),
            mail_webhook_url: get_env_opt("MAIL_WEBHOOK_URL"),
            mail_from: get_env_or("MAIL_FROM", "no-reply@jobboard.local"),
            chrome_bin: get_env_opt("CHROME_BIN"),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
