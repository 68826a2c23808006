//! Server-level errors
//!
//! Protocol and board rejections never reach this type; they are answered on
//! the wire. `ServerError` covers startup and transport failures only.

use shared::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid board configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to parse configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let err: ServerError = io_error.into();
        assert!(matches!(err, ServerError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: taken");
    }

    #[test]
    fn test_config_error_formatting() {
        let err: ServerError = ConfigError::EmptyPalette.into();
        assert_eq!(
            err.to_string(),
            "Invalid board configuration: Color palette must not be empty"
        );
    }
}
