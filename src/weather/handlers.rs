use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use tracing::{info, instrument};

use super::{
    client::WeatherError,
    dto::{Weather, WeatherQuery},
};
use crate::{
    auth::extractors::AuthUser,
    response::{ApiError, ApiResponse},
    state::AppState,
};

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(get_weather))
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Unauthorized => ApiError::Unauthorized(e.to_string()),
            WeatherError::NotFound => ApiError::NotFound(e.to_string()),
            WeatherError::Upstream(_) => ApiError::internal("unable to fetch weather data", e),
        }
    }
}

/// Only the part before the first comma is sent upstream ("Paris, FR" → "Paris").
fn city_query(raw: &str) -> Option<&str> {
    let city = raw.split(',').next().unwrap_or_default().trim();
    (!city.is_empty()).then_some(city)
}

#[instrument(skip_all, fields(email = %user.email))]
pub async fn get_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<WeatherQuery>,
) -> Result<ApiResponse<Weather>, ApiError> {
    let raw = q.city.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(ApiError::BadRequest("city is required".into()));
    }
    let city = city_query(&raw).ok_or_else(|| ApiError::BadRequest("invalid city name".into()))?;

    let weather = state.weather.current(city).await?;
    info!(city = %weather.city, "weather served");
    Ok(ApiResponse::ok(weather))
}
