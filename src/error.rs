//! Error types and handling for the `CityBrief` application

use thiserror::Error;

/// Main error type for the `CityBrief` application
#[derive(Error, Debug)]
pub enum CityBriefError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl CityBriefError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CityBriefError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            CityBriefError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            CityBriefError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            CityBriefError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            CityBriefError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = CityBriefError::config("missing base URL");
        assert!(matches!(config_err, CityBriefError::Config { .. }));

        let api_err = CityBriefError::api("connection failed");
        assert!(matches!(api_err, CityBriefError::Api { .. }));

        let validation_err = CityBriefError::validation("city name is empty");
        assert!(matches!(validation_err, CityBriefError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = CityBriefError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = CityBriefError::api("test");
        assert!(api_err.user_message().contains("Unable to connect"));

        let validation_err = CityBriefError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let brief_err: CityBriefError = io_err.into();
        assert!(matches!(brief_err, CityBriefError::Io { .. }));
    }
}
