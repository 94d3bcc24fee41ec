//! Error types for lograte

use std::path::PathBuf;

/// lograte error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    #[error("Failed to open log file {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rotate log file {}: {source}", path.display())]
    RotateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Crash log redirection failed: {0}")]
    CrashLog(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for lograte
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn open_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::OpenFailed {
            path: path.into(),
            source,
        }
    }

    pub fn rotate_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::RotateFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BackendNotFound("file".to_string());
        assert_eq!(err.to_string(), "Backend not found: file");
    }

    #[test]
    fn test_open_failed_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::open_failed("/var/log/app.log", io_err);
        assert_eq!(err.to_string(), "Failed to open log file /var/log/app.log: denied");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
