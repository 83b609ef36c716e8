pub(crate) mod sensor;

pub use sensor::SensorReading;

/// One complete fetch result. Replaced as a whole, never merged.
pub type SensorSnapshot = Vec<SensorReading>;

/// Where and how to reach the sensor API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiTarget {
    pub api_url: String,
    pub token: String,
    pub time_format: String,
}
