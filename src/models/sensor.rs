use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub name: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Battery voltage in millivolts.
    pub battery: f64,
    /// Display-ready measurement time.
    pub time: String,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, temperature: f64, battery: f64, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temperature,
            battery,
            time: time.into(),
        }
    }
}
