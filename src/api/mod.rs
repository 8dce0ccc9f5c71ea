//! Entry points for embedding the index in a long-lived process.

mod index;

pub use index::{SearchHit, SharedIndex};

use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
    #[error("internal error: {msg}")]
    Internal { msg: String },
}

impl From<radix_core::FormatError> for ApiError {
    fn from(e: radix_core::FormatError) -> Self {
        ApiError::InvalidData { msg: e.to_string() }
    }
}

pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Install a custom settings file. Must run before the first
/// `settings()` call anywhere in the process.
pub fn settings_load_config(path: &Path) -> Result<(), ApiError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApiError::Io {
        msg: format!("{}: {e}", path.display()),
    })?;
    radix_core::settings::init_custom(content)
        .map_err(|e| ApiError::InvalidData { msg: e.to_string() })?;
    Ok(())
}

pub fn settings_default_config() -> String {
    radix_core::settings::DEFAULT_SETTINGS_TOML.to_string()
}

pub fn trace_init(log_dir: &Path) {
    crate::trace_init::init_tracing(log_dir);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_maps_to_invalid_data() {
        let err: ApiError = radix_core::FormatError::Empty.into();
        assert_eq!(
            err,
            ApiError::InvalidData {
                msg: "empty document".into()
            }
        );
    }

    #[test]
    fn test_settings_load_missing_file() {
        let err = settings_load_config(Path::new("/nonexistent/radixpack.toml")).unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }

    #[test]
    fn test_settings_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[pack]\nscore_precision = 99\n").unwrap();
        let err = settings_load_config(&path).unwrap_err();
        assert!(matches!(err, ApiError::InvalidData { .. }));
    }

    #[test]
    fn test_default_config_parses() {
        assert!(radix_core::settings::parse_settings_toml(&settings_default_config()).is_ok());
        assert!(!engine_version().is_empty());
    }
}
