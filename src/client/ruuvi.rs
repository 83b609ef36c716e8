use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::Deserialize;
use std::fmt::Display;
use std::time::Instant;

use crate::client::rawv2;
use crate::client::{ClientError, SensorSource};
use crate::models::{ApiTarget, SensorReading, SensorSnapshot};

const FALLBACK_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Deserialize)]
struct DenseResponse {
    result: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<DenseData>,
}

#[derive(Debug, Deserialize)]
struct DenseData {
    #[serde(default)]
    sensors: Vec<DenseSensor>,
}

#[derive(Debug, Deserialize)]
struct DenseSensor {
    sensor: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    measurements: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    data: String,
    timestamp: i64,
}

/// Client for the Ruuvi Network cloud API.
#[derive(Debug, Clone, Default)]
pub struct RuuviCloudClient {
    http: reqwest::Client,
}

impl RuuviCloudClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn dense_url(api_url: &str) -> String {
        format!(
            "{}/sensors-dense?measurements=true&sharedToMe=true",
            api_url.trim_end_matches('/')
        )
    }
}

impl SensorSource for RuuviCloudClient {
    async fn fetch_readings(&self, target: &ApiTarget) -> Result<SensorSnapshot, ClientError> {
        let start = Instant::now();
        let url = Self::dense_url(&target.api_url);
        debug!("-> GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&target.token)
            .send()
            .await?;
        let status = response.status();
        debug!("<- {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            // The API reports failures in the same envelope; fall back to the raw status.
            let message = serde_json::from_str::<DenseResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(ClientError::Api {
                status: status.to_string(),
                message,
            });
        }

        let readings = parse_dense_response(&body, &target.time_format, &Local)?;
        debug!("fetch_readings took: {} ms", start.elapsed().as_millis());
        Ok(readings)
    }
}

fn valid_time_format(time_format: &str) -> &str {
    if StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error)) {
        warn!("Invalid time format {:?}, using {:?}", time_format, FALLBACK_TIME_FORMAT);
        FALLBACK_TIME_FORMAT
    } else {
        time_format
    }
}

fn format_timestamp<Tz>(timestamp: i64, time_format: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(tz).format(time_format).to_string(),
        None => String::new(),
    }
}

/// Turns a `sensors-dense` response body into a snapshot, one reading per sensor in API order.
pub fn parse_dense_response<Tz>(
    body: &str,
    time_format: &str,
    tz: &Tz,
) -> Result<SensorSnapshot, ClientError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let response: DenseResponse = serde_json::from_str(body)?;
    trace!("Dense response: {:?}", response);

    if response.result != "success" {
        return Err(ClientError::Rejected(response.error.unwrap_or(response.result)));
    }

    let time_format = valid_time_format(time_format);
    let sensors = response.data.map(|data| data.sensors).unwrap_or_default();

    // Sensors can be listed twice when both owned and shared.
    let mut readings = IndexMap::<String, SensorReading>::new();
    for sensor in sensors {
        if readings.contains_key(&sensor.sensor) {
            continue;
        }
        let Some(measurement) = sensor.measurements.first() else {
            warn!("Sensor {} has no measurements, skipping", sensor.sensor);
            continue;
        };
        let decoded = match rawv2::decode_hex(&measurement.data) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Sensor {} payload not decodable: {}", sensor.sensor, e);
                continue;
            }
        };

        let name = if sensor.name.trim().is_empty() {
            sensor.sensor.clone()
        } else {
            sensor.name
        };

        readings.insert(
            sensor.sensor,
            SensorReading {
                name,
                temperature: decoded.temperature,
                battery: f64::from(decoded.battery),
                time: format_timestamp(measurement.timestamp, time_format, tz),
            },
        );
    }

    Ok(readings.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const PAYLOAD: &str = "0201061BFF99040512FC5394C37C0004FFFC040CAC364200CDCBB8334C884F";

    fn body() -> String {
        format!(
            r#"{{
                "result": "success",
                "data": {{
                    "sensors": [
                        {{"sensor": "CB:B8:33:4C:88:4F", "name": "Living room",
                          "measurements": [{{"data": "{PAYLOAD}", "timestamp": 1760875200, "rssi": -70}}]}},
                        {{"sensor": "AA:BB:CC:DD:EE:FF", "name": "",
                          "measurements": [{{"data": "05FC1853945C7C0004FFFC040CAC364200CDCBB8334C884F", "timestamp": 1760875260}}]}},
                        {{"sensor": "11:22:33:44:55:66", "name": "Offline", "measurements": []}},
                        {{"sensor": "22:33:44:55:66:77", "name": "Broken",
                          "measurements": [{{"data": "0312FC", "timestamp": 1760875200}}]}},
                        {{"sensor": "CB:B8:33:4C:88:4F", "name": "Shared copy",
                          "measurements": [{{"data": "{PAYLOAD}", "timestamp": 1760875200}}]}}
                    ]
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_dense_response() {
        let readings = parse_dense_response(&body(), "%H:%M", &Utc).unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].name, "Living room");
        assert!((readings[0].temperature - 24.3).abs() < 1e-9);
        assert_eq!(readings[0].battery, 2977.0);
        assert_eq!(readings[0].time, "12:00");
        assert_eq!(readings[1].name, "AA:BB:CC:DD:EE:FF");
        assert!((readings[1].temperature - -5.0).abs() < 1e-9);
        assert_eq!(readings[1].time, "12:01");
    }

    #[test]
    fn test_api_error() {
        let body = r#"{"result": "error", "error": "Unauthorized", "code": "ER_UNAUTHORIZED"}"#;

        let err = parse_dense_response(body, "%H:%M", &Utc).unwrap_err();

        assert!(matches!(err, ClientError::Rejected(ref message) if message == "Unauthorized"));
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_dense_response("<html>", "%H:%M", &Utc).unwrap_err();

        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn test_invalid_time_format_falls_back() {
        let readings = parse_dense_response(&body(), "%H:%", &Utc).unwrap();

        assert_eq!(readings[0].time, "19.10.2025 12:00");
    }

    #[test]
    fn test_dense_url() {
        assert_eq!(
            RuuviCloudClient::dense_url("https://network.ruuvi.com/"),
            "https://network.ruuvi.com/sensors-dense?measurements=true&sharedToMe=true"
        );
    }
}
