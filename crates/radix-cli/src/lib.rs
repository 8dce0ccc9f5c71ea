pub mod commands;
pub mod entry_source;

use std::io;

use radix_core::settings::SettingsError;
use radix_core::FormatError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid packed document: {0}")]
    Format(#[from] FormatError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}
