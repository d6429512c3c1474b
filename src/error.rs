//! Application-wide error types.

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn comms_error_display() {
        let e = AppError::Comms("bind failed".into());
        assert!(e.to_string().contains("bind failed"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::UnknownProvider("watson".into()).into();
        assert!(e.to_string().contains("provider error"));
        assert!(e.to_string().contains("watson"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
