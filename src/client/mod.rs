use std::future::Future;
use thiserror::Error;

use crate::models::{ApiTarget, SensorSnapshot};

pub mod rawv2;
pub mod ruuvi;

pub use ruuvi::RuuviCloudClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: String, message: String },

    #[error("API rejected request: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Something that can produce a complete sensor snapshot for an API target.
pub trait SensorSource: Send + Sync + 'static {
    fn fetch_readings(
        &self,
        target: &ApiTarget,
    ) -> impl Future<Output = Result<SensorSnapshot, ClientError>> + Send;
}
