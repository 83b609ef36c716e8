use askama::Template;

use crate::config::WidgetConfig;
use crate::renderer::{RenderState, SensorRow};

#[derive(Template)]
#[template(path = "sensors.html")]
struct SensorsTemplate<'a> {
    placeholder: Option<&'a str>,
    rows: &'a [SensorRow],
    updated: Option<&'a str>,
    temperature_icon: &'a str,
    battery_empty_icon: &'a str,
}

/// Renders the widget markup for `state`.
pub fn render(widget: &WidgetConfig, state: &RenderState) -> askama::Result<String> {
    let (placeholder, rows, updated) = match state {
        RenderState::NotConfigured { message } | RenderState::Loading { message } => {
            (Some(message.as_str()), &[][..], None)
        }
        RenderState::Table { rows, updated } => (None, rows.as_slice(), updated.as_deref()),
    };

    SensorsTemplate {
        placeholder,
        rows,
        updated,
        temperature_icon: &widget.temperature_icon,
        battery_empty_icon: &widget.battery_empty_icon,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, battery_empty: bool, temperature: &str, highlight: Option<&str>) -> SensorRow {
        SensorRow {
            name: name.to_string(),
            battery_empty,
            temperature: temperature.to_string(),
            highlight: highlight.map(str::to_string),
        }
    }

    #[test]
    fn test_placeholder_markup() {
        let html = render(
            &WidgetConfig::default(),
            &RenderState::Loading { message: "Ladataan…".to_string() },
        )
        .unwrap();

        assert!(html.contains(r#"<table class="ruuvi-api-sensors-lite small">Ladataan…</table>"#));
        assert!(!html.contains("<tr>"));
    }

    #[test]
    fn test_table_markup() {
        let state = RenderState::Table {
            rows: vec![
                row("Sauna", false, "80,1", None),
                row("Balcony", true, "\u{2212}3,3", Some("#4800FF")),
            ],
            updated: Some("19.10.2026 12:00".to_string()),
        };

        let html = render(&WidgetConfig::default(), &state).unwrap();

        assert!(html.contains(r#"<td class="name">Sauna</td>"#));
        assert!(html.contains(r#"<td class="align-right bright temperature">80,1 &#8451;</td>"#));
        assert!(html.contains(r#"<td class="name">Balcony<span class="battery-empty-icon"><i class="fas fa-battery-half"></i></span></td>"#));
        assert!(html.contains("<span style=\"color:#4800FF;\">\u{2212}3,3</span> &#8451;"));
        assert!(html.contains(r#"<i class="fas fa-temperature-half"></i>"#));
        assert_eq!(html.matches(r#"colspan="3""#).count(), 1);
        assert!(html.contains("19.10.2026 12:00"));
    }

    #[test]
    fn test_names_are_escaped() {
        let state = RenderState::Table {
            rows: vec![row("<b>Garage</b>", false, "5,0", None)],
            updated: None,
        };

        let html = render(&WidgetConfig::default(), &state).unwrap();

        assert!(html.contains("&lt;b&gt;Garage&lt;/b&gt;"));
        assert!(!html.contains("colspan"));
    }
}
