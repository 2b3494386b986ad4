//! OpenWeatherMap Client
//!
//! Fetches current conditions per tracked city. Without an API key
//! the client serves the canned mock records immediately; with one, a
//! per-city failure degrades to a per-city "Unknown" record rather
//! than failing the whole snapshot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ProviderConfig;
use crate::domain::model::CityWeather;
use crate::ports::providers::WeatherProvider;

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainBlock,
    weather: Vec<ConditionsBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionsBlock {
    main: String,
    icon: String,
}

/// OpenWeatherMap-backed weather provider.
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.openweather_url.clone(),
            api_key: config.weather_api_key.clone(),
        })
    }

    async fn fetch_city(&self, city: &str, api_key: &str) -> Result<CityWeather> {
        let url = format!(
            "{}/weather?q={}&units=metric&appid={}",
            self.base_url, city, api_key
        );

        let body: WeatherResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Failed to decode weather for {city}"))?;

        let conditions = body.weather.first();
        Ok(CityWeather {
            city: city.to_string(),
            temperature: body.main.temp,
            humidity: body.main.humidity,
            conditions: conditions.map_or_else(|| "Unknown".into(), |c| c.main.clone()),
            icon: conditions.map_or_else(|| "01d".into(), |c| c.icon.clone()),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, cities: &[String]) -> Vec<CityWeather> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("No weather API key configured, serving mock records");
            return mock_weather();
        };

        let mut records = Vec::with_capacity(cities.len());
        for city in cities {
            match self.fetch_city(city, api_key).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(city = %city, error = %e, "Weather fetch failed for city");
                    records.push(fallback_city(city));
                }
            }
        }
        records
    }
}

/// Per-city record served when that city's fetch fails.
fn fallback_city(city: &str) -> CityWeather {
    CityWeather {
        city: city.to_string(),
        temperature: 0.0,
        humidity: 0.0,
        conditions: "Unknown".into(),
        icon: "01d".into(),
    }
}

/// Canned snapshot served when no API key is configured.
pub fn mock_weather() -> Vec<CityWeather> {
    vec![
        CityWeather {
            city: "New York".into(),
            temperature: 22.0,
            humidity: 65.0,
            conditions: "Cloudy".into(),
            icon: "03d".into(),
        },
        CityWeather {
            city: "London".into(),
            temperature: 18.0,
            humidity: 70.0,
            conditions: "Rainy".into(),
            icon: "10d".into(),
        },
        CityWeather {
            city: "Tokyo".into(),
            temperature: 28.0,
            humidity: 55.0,
            conditions: "Sunny".into(),
            icon: "01d".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_response_parses() {
        let body: WeatherResponse = serde_json::from_str(
            r#"{
                "main": {"temp": 17.8, "humidity": 72},
                "weather": [{"main": "Rain", "icon": "10d", "description": "light rain"}]
            }"#,
        )
        .unwrap();
        assert_eq!(body.main.humidity, 72.0);
        assert_eq!(body.weather[0].main, "Rain");
    }

    #[tokio::test]
    async fn missing_api_key_serves_mock_records() {
        let client = OpenWeatherClient::new(&ProviderConfig::default()).unwrap();
        let records = client.fetch(&["London".into()]).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].city, "London");
        assert_eq!(records[1].conditions, "Rainy");
    }

    #[tokio::test]
    async fn per_city_failure_degrades_to_fallback_record() {
        let config = ProviderConfig {
            openweather_url: "http://127.0.0.1:1".into(),
            weather_api_key: Some("test-key".into()),
            timeout_secs: 1,
            ..ProviderConfig::default()
        };
        let client = OpenWeatherClient::new(&config).unwrap();

        let records = client.fetch(&["London".into(), "Tokyo".into()]).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.conditions == "Unknown"));
    }
}
