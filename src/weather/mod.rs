use crate::state::AppState;
use axum::Router;

pub mod client;
pub(crate) mod dto;
pub mod handlers;

pub use client::{OpenWeatherClient, WeatherProvider};

/// Weather routes; mounted behind the auth gate by the app router.
pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::weather_routes())
}
