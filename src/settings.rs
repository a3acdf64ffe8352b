//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub cost: CostSettings,
    pub decode: DecodeSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    pub unknown_word_cost: i16,
    pub unknown_left_id: u16,
    pub unknown_right_id: u16,
    pub unknown_feature: String,
    pub bos_eos_id: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecodeSettings {
    pub theta: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub eos_format: String,
    pub wakati_separator: String,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        };
    }

    check_non_negative!(cost.unknown_word_cost);
    check_non_empty!(cost.unknown_feature);

    if !(s.decode.theta.is_finite() && s.decode.theta > 0.0) {
        return Err(SettingsError::InvalidValue {
            field: "decode.theta".to_string(),
            reason: "must be a positive finite number".to_string(),
        });
    }

    check_non_empty!(output.eos_format);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.cost.unknown_word_cost, 10000);
        assert_eq!(s.cost.unknown_left_id, 0);
        assert_eq!(s.cost.unknown_right_id, 0);
        assert_eq!(s.cost.unknown_feature, "UNK");
        assert_eq!(s.cost.bos_eos_id, 0);
        assert!((s.decode.theta - 0.75).abs() < f64::EPSILON);
        assert_eq!(s.output.eos_format, "EOS\n");
        assert_eq!(s.output.wakati_separator, " ");
    }

    #[test]
    fn parse_valid_custom_toml() {
        let toml = r#"
[cost]
unknown_word_cost = 3000
unknown_left_id = 5
unknown_right_id = 6
unknown_feature = "名詞,一般,*"
bos_eos_id = 0

[decode]
theta = 1.0

[output]
eos_format = "EOS\n"
wakati_separator = "|"
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.cost.unknown_word_cost, 3000);
        assert_eq!(s.cost.unknown_right_id, 6);
        assert_eq!(s.cost.unknown_feature, "名詞,一般,*");
        assert_eq!(s.output.wakati_separator, "|");
    }

    #[test]
    fn error_negative_unknown_cost() {
        let toml = r#"
[cost]
unknown_word_cost = -1
unknown_left_id = 0
unknown_right_id = 0
unknown_feature = "UNK"
bos_eos_id = 0

[decode]
theta = 0.75

[output]
eos_format = "EOS\n"
wakati_separator = " "
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("cost.unknown_word_cost"));
    }

    #[test]
    fn error_zero_theta() {
        let toml = r#"
[cost]
unknown_word_cost = 10000
unknown_left_id = 0
unknown_right_id = 0
unknown_feature = "UNK"
bos_eos_id = 0

[decode]
theta = 0.0

[output]
eos_format = "EOS\n"
wakati_separator = " "
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("decode.theta"));
    }

    #[test]
    fn error_empty_unknown_feature() {
        let toml = r#"
[cost]
unknown_word_cost = 10000
unknown_left_id = 0
unknown_right_id = 0
unknown_feature = ""
bos_eos_id = 0

[decode]
theta = 0.75

[output]
eos_format = "EOS\n"
wakati_separator = " "
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("cost.unknown_feature"));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[cost]
unknown_word_cost = 10000
unknown_left_id = 0
unknown_right_id = 0
unknown_feature = "UNK"
bos_eos_id = 0
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
