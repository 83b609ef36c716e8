use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;

use crate::config::{DashboardConfig, WidgetConfig};
use crate::renderer::RenderState;

pub mod console;
pub mod html;

/// Receives every render state the widget produces.
pub trait Presenter {
    fn present(&mut self, state: &RenderState) -> Result<()>;
}

/// Writes the widget markup to a file and optionally prints a console table.
pub struct Dashboard {
    widget: WidgetConfig,
    dashboard: DashboardConfig,
}

impl Dashboard {
    pub fn new(widget: WidgetConfig, dashboard: DashboardConfig) -> Self {
        Self { widget, dashboard }
    }

    pub fn save_html(&self, state: &RenderState) -> Result<()> {
        let target_file = &self.dashboard.file;
        let markup = html::render(&self.widget, state).context("Failed to render widget markup")?;

        fs::write(target_file, markup)
            .context(format!("Failed to save dashboard to {}", target_file))?;
        debug!("Dashboard written to {}", target_file);
        Ok(())
    }
}

impl Presenter for Dashboard {
    fn present(&mut self, state: &RenderState) -> Result<()> {
        if self.dashboard.save_to_file {
            self.save_html(state)?;
        }
        if self.dashboard.console {
            info!("Sensor readings\n{}", console::render(state));
        }
        Ok(())
    }
}
