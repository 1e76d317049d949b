// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-facing responses
// - Provides a consistent error format for every command
// - Never exposes internal implementation details
// - Logs errors for debugging

use std::fmt;

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for the user surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for the user surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A card name has no match
    NotFound,

    /// Invalid input
    Validation,

    /// Domain invariant violation
    DomainError,

    /// Unusable configuration, vocabulary or destination (fatal)
    Configuration,

    /// Card-data, exchange-rate or advice service failure
    ExternalService,

    /// File system error
    FileSystem,

    /// The user cancelled the run
    Cancelled,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::CardNotFound(name) => {
                Self::new(ErrorType::NotFound, format!("Card not found: {}", name), None)
            }

            AppError::Validation(message) => Self::new(ErrorType::Validation, message, None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Config(message) => {
                error!("Configuration error: {}", message);
                Self::new(
                    ErrorType::Configuration,
                    "The run cannot start",
                    Some(message),
                )
            }

            err @ (AppError::Transport(_) | AppError::Upstream { .. }) => {
                error!("External service error: {}", err);
                Self::new(
                    ErrorType::ExternalService,
                    "External service error",
                    Some(err.to_string()),
                )
            }

            AppError::AssetMissing(asset) => Self::new(
                ErrorType::FileSystem,
                "Asset missing",
                Some(asset),
            ),

            AppError::Cancelled => Self::new(ErrorType::Cancelled, "Operation cancelled", None),

            AppError::Io(io_error) => {
                error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::FileSystem,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            err @ (AppError::Pdf(_) | AppError::Image(_)) => {
                error!("Rendering error: {}", err);
                Self::new(
                    ErrorType::Internal,
                    "Document rendering failed",
                    Some(err.to_string()),
                )
            }

            AppError::Serialization(serde_error) => {
                error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Other(message) => {
                error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorResponse {}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, ErrorResponse>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, ErrorResponse> {
        self.map_err(ErrorResponse::from_app_error)
    }
}
