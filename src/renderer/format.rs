/// Display locales the widget knows how to format numbers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    En,
    #[default]
    Fi,
}

impl Locale {
    /// Maps a language code such as `en`, `en-GB` or `fi`. Anything else falls back to Finnish.
    pub fn from_language(language: &str) -> Self {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match primary.as_str() {
            "en" => Locale::En,
            _ => Locale::Fi,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fi => "fi",
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::En => '.',
            Locale::Fi => ',',
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Locale::En => ',',
            Locale::Fi => '\u{a0}',
        }
    }

    fn minus_sign(&self) -> char {
        match self {
            Locale::En => '-',
            Locale::Fi => '\u{2212}',
        }
    }
}

/// Rounds `(value + EPSILON) * 10^decimals` half away from zero and scales back.
pub fn round_decimal(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    ((value + f64::EPSILON) * factor).round() / factor
}

/// Formats `value` with exactly `decimals` fraction digits for `locale`.
///
/// Zero and NaN format as an empty string.
pub fn format_decimal(value: f64, decimals: u32, locale: Locale) -> String {
    if value == 0.0 || value.is_nan() {
        return String::new();
    }

    let rounded = round_decimal(value, decimals);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 4);
    if rounded.is_sign_negative() {
        out.push(locale.minus_sign());
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(locale.group_separator());
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push(locale.decimal_separator());
        out.push_str(fraction);
    }
    out
}
