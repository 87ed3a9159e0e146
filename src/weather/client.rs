use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use super::dto::{UpstreamError, UpstreamWeather, Weather};
use crate::config::WeatherConfig;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("invalid weather API key")]
    Unauthorized,
    #[error("city not found")]
    NotFound,
    #[error("weather service error: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for `city`, already reduced to the query term.
    async fn current(&self, city: &str) -> Result<Weather, WeatherError>;
}

/// OpenWeather "current weather" endpoint, metric units.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    lang: String,
}

impl OpenWeatherClient {
    pub fn new(cfg: &WeatherConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build weather http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            lang: cfg.lang.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<Weather, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "weather request failed");
                WeatherError::Upstream("weather service unreachable".into())
            })?;

        let status = res.status();
        let body = res.bytes().await.map_err(|e| {
            error!(error = %e, "weather response read failed");
            WeatherError::Upstream("could not read weather response".into())
        })?;
        if body.is_empty() {
            return Err(WeatherError::Upstream("empty weather response".into()));
        }

        if !status.is_success() {
            warn!(%status, city, "weather upstream returned error");
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
                StatusCode::NOT_FOUND => WeatherError::NotFound,
                _ => {
                    let message = serde_json::from_slice::<UpstreamError>(&body)
                        .map(|e| e.message)
                        .unwrap_or_default();
                    if message.is_empty() {
                        WeatherError::Upstream(status.to_string())
                    } else {
                        WeatherError::Upstream(message)
                    }
                }
            });
        }

        let payload: UpstreamWeather = serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "weather payload decode failed");
            WeatherError::Upstream("could not decode weather data".into())
        })?;

        let weather = payload
            .normalize()
            .ok_or_else(|| WeatherError::Upstream("no weather data".into()))?;
        debug!(city = %weather.city, "weather fetched");
        Ok(weather)
    }
}
