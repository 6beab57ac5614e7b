//! Server configuration.
//!
//! Everything is read from environment variables (after `.env` has been loaded). Invalid values are reported and
//! replaced by their defaults, so the server always starts with a usable configuration.
//!
//! | Variable                      | Default                       |
//! |-------------------------------|-------------------------------|
//! | `SF_HOST`                     | `127.0.0.1`                   |
//! | `SF_PORT`                     | `8370`                        |
//! | `SF_DATABASE_URL`             | `sqlite://data/storefront.db` |
//! | `SF_AUTO_MIGRATE`             | `true`                        |
//! | `SF_JWT_SECRET`               | random, per session           |
//! | `SF_POINT_RATE`               | `100000`                      |
//! | `SF_SETTLEMENT_DELAY`         | `60` (seconds)                |
//! | `SF_SETTLEMENT_POLL_INTERVAL` | `5` (seconds)                 |
//! | `SF_SETTLEMENT_RETRY_DELAY`   | `30` (seconds)                |
//! | `SF_SETTLEMENT_MAX_ATTEMPTS`  | `5`                           |
use std::{env, str::FromStr, time::Duration};

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sf_common::{parse_flag, PointRate, Secret};
use storefront_engine::OrderFlowConfig;

use crate::errors::ServerError;

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_SETTLEMENT_DELAY: u64 = 60;
const DEFAULT_POLL_INTERVAL: u64 = 5;
const DEFAULT_RETRY_DELAY: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: i64 = 5;
const MAX_DELAY_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Apply the embedded database migrations on start-up.
    pub auto_migrate: bool,
    pub auth: AuthConfig,
    pub order_flow: OrderFlowConfig,
    /// How often the settlement worker looks for due batches.
    pub settlement_poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auto_migrate: true,
            auth: AuthConfig::default(),
            order_flow: OrderFlowConfig::default(),
            settlement_poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = parse_env_value("SF_PORT", env::var("SF_PORT").ok(), DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SF_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auto_migrate = match env::var("SF_AUTO_MIGRATE") {
            Ok(value) => parse_flag(&value).unwrap_or_else(|| {
                warn!("🪛️ SF_AUTO_MIGRATE is not a valid on/off value: {value}. Migrations will run.");
                true
            }),
            Err(_) => true,
        };
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. A random JWT \
                 secret will be used for this session, and tokens from the login service will NOT be accepted."
            );
            AuthConfig::default()
        });
        let order_flow = order_flow_config_from(|name| env::var(name).ok());
        let mut poll = parse_env_value(
            "SF_SETTLEMENT_POLL_INTERVAL",
            env::var("SF_SETTLEMENT_POLL_INTERVAL").ok(),
            DEFAULT_POLL_INTERVAL,
        );
        if poll == 0 {
            warn!("🪛️ SF_SETTLEMENT_POLL_INTERVAL must be at least 1s. Using the default, {DEFAULT_POLL_INTERVAL}s.");
            poll = DEFAULT_POLL_INTERVAL;
        }
        let settlement_poll_interval = Duration::from_secs(poll);
        Self { host, port, database_url, auto_migrate, auth, order_flow, settlement_poll_interval }
    }
}

/// Builds the order flow settings from a variable lookup. Split out from [`ServerConfig::from_env_or_default`] so
/// that it can be exercised without touching the process environment.
pub fn order_flow_config_from<F>(lookup: F) -> OrderFlowConfig
where F: Fn(&str) -> Option<String> {
    let rate = parse_env_value("SF_POINT_RATE", lookup("SF_POINT_RATE"), PointRate::DEFAULT.value());
    let point_rate = PointRate::new(rate).unwrap_or_else(|e| {
        error!("🪛️ {e}. Using the default point rate, {}, instead.", PointRate::DEFAULT.value());
        PointRate::DEFAULT
    });
    let delay = parse_env_value("SF_SETTLEMENT_DELAY", lookup("SF_SETTLEMENT_DELAY"), DEFAULT_SETTLEMENT_DELAY);
    let retry = parse_env_value("SF_SETTLEMENT_RETRY_DELAY", lookup("SF_SETTLEMENT_RETRY_DELAY"), DEFAULT_RETRY_DELAY);
    let mut max_attempts =
        parse_env_value("SF_SETTLEMENT_MAX_ATTEMPTS", lookup("SF_SETTLEMENT_MAX_ATTEMPTS"), DEFAULT_MAX_ATTEMPTS);
    if max_attempts < 1 {
        warn!("🪛️ SF_SETTLEMENT_MAX_ATTEMPTS must be at least 1. Using the default, {DEFAULT_MAX_ATTEMPTS}.");
        max_attempts = DEFAULT_MAX_ATTEMPTS;
    }
    OrderFlowConfig {
        point_rate,
        settlement_delay: seconds(delay),
        retry_delay: seconds(retry),
        max_attempts,
        ..OrderFlowConfig::default()
    }
}

fn seconds(secs: u64) -> chrono::Duration {
    let secs = i64::try_from(secs).unwrap_or(MAX_DELAY_SECS).min(MAX_DELAY_SECS);
    chrono::Duration::seconds(secs)
}

/// Parses `value`, logging and returning `default` if it is missing or malformed.
fn parse_env_value<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match value {
        None => default,
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the login service.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SF_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("SF_JWT_SECRET is not available. {e}")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("SF_JWT_SECRET is empty".into()));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
