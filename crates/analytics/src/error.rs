use core_types::DataIntegrityError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Trade rejected: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
