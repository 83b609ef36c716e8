use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::renderer::format::Locale;

/// Floor for the re-arm delay, whatever `update_interval` says.
pub const MIN_UPDATE_INTERVAL_MS: u64 = 60 * 1000;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WidgetConfig {
    pub temperature_icon: String,
    pub battery_empty_icon: String,
    /// Milliseconds between fetches.
    pub update_interval: u64,
    pub api_url: String,
    pub token: String,
    pub negative_color: String,
    pub highlight_negative: bool,
    /// Battery voltage in millivolts at or below which a sensor is shown as empty.
    pub battery_limit: f64,
    pub time_format: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub file: String,
    pub save_to_file: bool,
    pub console: bool,
    pub language: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            temperature_icon: "temperature-half".to_string(),
            battery_empty_icon: "battery-half".to_string(),
            update_interval: 5 * 60 * 1000,
            api_url: "https://network.ruuvi.com".to_string(),
            token: String::new(),
            negative_color: "#4800FF".to_string(),
            highlight_negative: true,
            battery_limit: 2420.0,
            time_format: "%d.%m.%Y %H:%M".to_string(),
        }
    }
}

impl WidgetConfig {
    /// The widget counts as configured once an API token is present.
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            file: "ruuvi-sensors.html".to_string(),
            save_to_file: true,
            console: true,
            language: "fi".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn locale(&self) -> Locale {
        Locale::from_language(&self.language)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            widget: WidgetConfig::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    /// Loads `path`, writing a default configuration there first if nothing exists yet.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        if !config_path.exists() {
            let config = AppConfig::default();
            config.save(config_path)?;
            return Ok(config);
        }
        Self::from_file(config_path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::with_name(config_path.to_str().unwrap_or("")).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config.try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!(
            "[widget]\ntemperature_icon = {}\nbattery_empty_icon = {}\nupdate_interval = {}\napi_url = \"{}\"\ntoken = \"{}\"\nnegative_color = \"{}\"\nhighlight_negative = {}\nbattery_limit = {}\ntime_format = \"{}\"\n\n",
            self.widget.temperature_icon,
            self.widget.battery_empty_icon,
            self.widget.update_interval,
            self.widget.api_url,
            self.widget.token,
            self.widget.negative_color,
            self.widget.highlight_negative,
            self.widget.battery_limit,
            self.widget.time_format
        ));

        config_str.push_str(&format!(
            "[dashboard]\nfile = {}\nsave_to_file = {}\nconsole = {}\nlanguage = {}\n\n",
            self.dashboard.file,
            self.dashboard.save_to_file,
            self.dashboard.console,
            self.dashboard.language
        ));

        config_str.push_str(&format!(
            "[logging]\nlevel = {}\n",
            self.logging.level
        ));

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
