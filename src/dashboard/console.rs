use tabled::settings::object::Rows;
use tabled::settings::{Alignment, Modify, Panel, Style};
use tabled::{Table, Tabled};

use crate::renderer::RenderState;

#[derive(Tabled)]
struct ConsoleRow {
    #[tabled(rename = "Sensor")]
    name: String,
    #[tabled(rename = "Temperature")]
    temperature: String,
}

/// Renders `state` as a plain text table for the terminal.
pub fn render(state: &RenderState) -> String {
    match state {
        RenderState::NotConfigured { message } | RenderState::Loading { message } => message.clone(),
        RenderState::Table { rows, updated } => {
            let rows: Vec<ConsoleRow> = rows
                .iter()
                .map(|row| ConsoleRow {
                    name: if row.battery_empty {
                        format!("{} [battery low]", row.name)
                    } else {
                        row.name.clone()
                    },
                    temperature: format!("{} °C", row.temperature),
                })
                .collect();

            let mut table = Table::new(rows);
            table
                .with(Style::sharp())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            if let Some(updated) = updated {
                table.with(Panel::footer(updated));
            }
            table.to_string()
        }
    }
}
