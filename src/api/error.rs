//! DoubleCloud API error types

use crate::context::ContextError;
use thiserror::Error;

/// Errors raised while talking to the DoubleCloud API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("API request failed: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("operation {id} failed: {message}")]
    Operation { id: String, message: String },

    #[error("operation {id} finished without a resource id")]
    MissingResourceId { id: String },

    #[error("waiting interrupted: {0}")]
    Cancelled(#[from] ContextError),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
