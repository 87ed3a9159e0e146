use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub lang: String,
    pub timeout_secs: u64,
}

/// Upper bound for `JWT_TTL_MINUTES`: one year.
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub weather: WeatherConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is required")?;

        let secret = lookup("JWT_SECRET").context("JWT_SECRET is required")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let ttl_minutes: i64 = parse_or(&lookup, "JWT_TTL_MINUTES", 60 * 24);
        anyhow::ensure!(
            (1..=MAX_JWT_TTL_MINUTES).contains(&ttl_minutes),
            "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {ttl_minutes}"
        );
        let jwt = JwtConfig {
            secret,
            ttl_minutes,
        };

        let weather = WeatherConfig {
            api_key: lookup("OPENWEATHER_API_KEY").unwrap_or_default(),
            base_url: lookup("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| "https://api.openweathermap.org".into()),
            lang: lookup("WEATHER_LANG").unwrap_or_else(|| "fr".into()),
            timeout_secs: parse_or(&lookup, "WEATHER_TIMEOUT_SECS", 10),
        };

        if weather.api_key.is_empty() {
            tracing::warn!("OPENWEATHER_API_KEY is not set; weather lookups will be rejected upstream");
        }

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080),
            database_url,
            storage_timeout_secs: parse_or(&lookup, "STORAGE_TIMEOUT_SECS", 5),
            jwt,
            weather,
        })
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
