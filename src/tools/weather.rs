// src/tools/weather.rs

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::tools::{CurrentWeather, RetryPolicy, WeatherLookup, check_status};

/// Current conditions from Open-Meteo: geocode the city, then fetch the forecast.
pub struct WeatherClient {
    client: reqwest::blocking::Client,
    geocoding_base: String,
    forecast_base: String,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Deserialize)]
struct Place {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
}

impl WeatherClient {
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            geocoding_base: config.geocoding_api_base.trim_end_matches('/').to_string(),
            forecast_base: config.forecast_api_base.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(config.retries, Duration::from_millis(config.backoff_ms)),
        })
    }

    pub fn get_weather(&self, city: &str) -> Result<WeatherLookup, ToolError> {
        self.retry.run("weather", || self.lookup_once(city))
    }

    fn lookup_once(&self, city: &str) -> Result<WeatherLookup, ToolError> {
        debug!(city, "geocoding city");

        let geo: GeocodingResponse = check_status(
            self.client
                .get(format!("{}/v1/search", self.geocoding_base))
                .query(&[("name", city), ("count", "1")])
                .send()?,
        )?
        .json()?;

        let Some(place) = geo.results.and_then(|r| r.into_iter().next()) else {
            return Ok(WeatherLookup::not_found());
        };

        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let forecast: ForecastResponse = check_status(
            self.client
                .get(format!("{}/v1/forecast", self.forecast_base))
                .query(&[
                    ("latitude", latitude.as_str()),
                    ("longitude", longitude.as_str()),
                    ("current_weather", "true"),
                ])
                .send()?,
        )?
        .json()?;

        Ok(WeatherLookup::Current(
            forecast.current_weather.unwrap_or_default(),
        ))
    }
}
