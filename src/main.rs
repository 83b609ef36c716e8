use env_logger::{Builder, WriteStyle};
use log::error;
use ruuvi_dashboard::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.ini".to_string());

    // Load configuration first (without logging)
    let config = AppConfig::load_or_init(&config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {:#}", e);
        // Fall back to default configuration
        AppConfig::default()
    });

    // Initialise logger with a configured log level
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Always)
        .format_timestamp_secs()
        .init();

    if let Err(e) = ruuvi_dashboard::run(config).await {
        error!("Application error: {}", e);
        return Err(e);
    }
    Ok(())
}
