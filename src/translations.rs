use anyhow::{Context, Result};
use serde::Deserialize;

use crate::renderer::format::Locale;

const EN: &str = include_str!("../translations/en.json");
const FI: &str = include_str!("../translations/fi.json");

/// Placeholder texts for one display locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Translations {
    pub loading: String,
    #[serde(rename = "configEmpty")]
    pub config_empty: String,
}

impl Translations {
    pub fn for_locale(locale: Locale) -> Result<Self> {
        let source = match locale {
            Locale::En => EN,
            Locale::Fi => FI,
        };
        serde_json::from_str(source)
            .context(format!("Failed to parse {} translations", locale.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_translations_parse() {
        let en = Translations::for_locale(Locale::En).unwrap();
        let fi = Translations::for_locale(Locale::Fi).unwrap();

        assert!(en.loading.starts_with("Loading"));
        assert!(fi.loading.starts_with("Ladataan"));
        assert!(en.config_empty.ends_with(' '));
        assert_ne!(en.config_empty, fi.config_empty);
    }
}
