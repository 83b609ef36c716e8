use anyhow::Context;
use log::{error, info};

use crate::client::RuuviCloudClient;
use crate::config::AppConfig;
use crate::dashboard::Dashboard;

pub mod client;
pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod models;
pub mod renderer;
pub mod scheduler;
pub mod translations;
pub mod widget;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting application");

    let mut dashboard = Dashboard::new(config.widget.clone(), config.dashboard.clone());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    match widget::run(&config, RuuviCloudClient::new(), &mut dashboard, shutdown).await {
        Ok(_) => info!("Application completed successfully"),
        Err(e) => {
            error!("Application error: {e:#}");
            // Print chain of error causes
            let mut source = e.source();
            while let Some(e) = source {
                error!("Caused by: {e}");
                source = e.source();
            }
            return Err(e).context("Application failed to run");
        }
    }

    Ok(())
}
