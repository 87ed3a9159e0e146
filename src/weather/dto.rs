use serde::{Deserialize, Serialize};

/// Normalized weather record returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: i64,
    pub pressure: i64,
    pub wind_speed: f64,
    pub feels_like: f64,
    pub icon: String,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

// --- upstream (OpenWeather current weather) payloads ---

#[derive(Debug, Deserialize)]
pub struct UpstreamWeather {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: UpstreamSys,
    pub main: UpstreamMain,
    #[serde(default)]
    pub wind: UpstreamWind,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamSys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamWind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Error body; `cod` is a number or a string depending on the failure.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamError {
    #[serde(default)]
    pub message: String,
}

impl UpstreamWeather {
    /// Maps the upstream payload to a [`Weather`]; `None` when it has no conditions.
    pub fn normalize(self) -> Option<Weather> {
        let condition = self.weather.into_iter().next()?;
        Some(Weather {
            city: self.name,
            country: self.sys.country,
            temperature: self.main.temp,
            description: condition.description,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            wind_speed: self.wind.speed,
            feels_like: self.main.feels_like,
            icon: condition.icon,
            condition: condition.main,
        })
    }
}
