use crate::config::WidgetConfig;
use crate::models::SensorReading;
use crate::renderer::format::{format_decimal, Locale};
use crate::translations::Translations;

pub mod format;

/// Name shown in the "not configured" placeholder.
pub const MODULE_NAME: &str = "ruuvi-dashboard";

/// One sensor line of the widget table.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRow {
    pub name: String,
    pub battery_empty: bool,
    /// Locale formatted value without unit, empty for zero.
    pub temperature: String,
    /// Colour to draw the temperature in, set for highlighted negative values.
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    NotConfigured { message: String },
    Loading { message: String },
    Table {
        rows: Vec<SensorRow>,
        /// Time of the first reading, shown once under the table.
        updated: Option<String>,
    },
}

/// Everything the deriver reads besides the snapshot.
pub struct RenderContext<'a> {
    pub widget: &'a WidgetConfig,
    pub translations: &'a Translations,
    pub locale: Locale,
}

/// Computes what the widget shows for the current snapshot. Pure.
pub fn derive(ctx: &RenderContext, snapshot: Option<&[SensorReading]>) -> RenderState {
    if !ctx.widget.is_configured() {
        return RenderState::NotConfigured {
            message: format!("{}{}.", ctx.translations.config_empty, MODULE_NAME),
        };
    }

    let Some(readings) = snapshot else {
        return RenderState::Loading {
            message: ctx.translations.loading.clone(),
        };
    };

    let rows = readings.iter().map(|reading| sensor_row(ctx, reading)).collect();
    let updated = readings.first().map(|reading| reading.time.clone());

    RenderState::Table { rows, updated }
}

fn sensor_row(ctx: &RenderContext, reading: &SensorReading) -> SensorRow {
    let highlight = (ctx.widget.highlight_negative && reading.temperature < 0.0)
        .then(|| ctx.widget.negative_color.clone());

    SensorRow {
        name: reading.name.clone(),
        battery_empty: reading.battery <= ctx.widget.battery_limit,
        temperature: format_decimal(reading.temperature, 1, ctx.locale),
        highlight,
    }
}
