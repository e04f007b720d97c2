// CLI error types

use dupfinder_core::FinderError;
use thiserror::Error;

use crate::cli::TOKEN_ENV;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Snyk API token is required")]
    MissingToken,

    #[error(transparent)]
    Finder(#[from] FinderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::MissingToken => format!(
                "Error: Snyk API token is required. Provide via --api-token or {} environment variable.",
                TOKEN_ENV
            ),
            CliError::Finder(FinderError::Authentication(msg)) => format!(
                "Authentication failed: {}\n\nCheck that the token in --api-token or {} is valid for this organization.",
                msg, TOKEN_ENV
            ),
            CliError::Finder(FinderError::NotFound(msg)) => format!(
                "Not found: {}\n\nCheck the organization ID and the API region (--base-url).",
                msg
            ),
            CliError::Finder(FinderError::TransientNetwork(msg)) => format!(
                "Network error: {}\n\nThe API could not be reached after several attempts; try again later.",
                msg
            ),
            CliError::Finder(FinderError::Config(msg)) => {
                format!("Configuration error: {}", msg)
            }
            CliError::Finder(FinderError::InvariantViolation(msg)) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
            CliError::Finder(other) => other.to_string(),
            CliError::Io(e) => format!("File operation failed: {}", e),
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;
