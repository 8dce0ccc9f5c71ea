//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::codec::{DuplicatePolicy, FormatVersion, MAX_SCORE_PRECISION};
use crate::normalize::CaseMode;

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
        // Both sources were validated already (build.rs, init_custom)
        parse_settings_toml(toml_str).unwrap_or_default()
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

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Settings {
    pub index: IndexSettings,
    pub pack: PackSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct IndexSettings {
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PackSettings {
    pub score_precision: u8,
    pub duplicates: DuplicatePolicy,
    pub version: u8,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            score_precision: 3,
            duplicates: DuplicatePolicy::KeepLast,
            version: FormatVersion::CURRENT.number(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchSettings {
    pub default_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl CaseMode {
    pub fn from_settings(s: &Settings) -> Self {
        CaseMode::from_flag(s.index.case_sensitive)
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! invalid {
        ($section:ident . $field:ident, $reason:expr) => {
            return Err(SettingsError::InvalidValue {
                field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                reason: $reason.to_string(),
            })
        };
    }

    if s.pack.score_precision > MAX_SCORE_PRECISION {
        invalid!(pack.score_precision, format!("must be at most {MAX_SCORE_PRECISION}"));
    }
    if FormatVersion::from_number(s.pack.version).is_none() {
        invalid!(pack.version, "must be 1 or 2");
    }
    if s.search.default_limit == 0 {
        invalid!(search.default_limit, "must be positive");
    }

    Ok(())
}
