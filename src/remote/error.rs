//! Shared error handling for the remote services.
//!
//! Both clients report non-success responses through [`ApiError`], which
//! carries the service name and HTTP status into [`PsaError::Api`].

use std::fmt;

use reqwest::StatusCode;

use crate::error::PsaError;

/// A non-success response from one of the services.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if the request got that far
    pub status: Option<StatusCode>,
    /// Response body, or the canonical reason when the body is empty
    pub message: String,
    /// Service name for context ("support", "project")
    pub service: &'static str,
}

impl ApiError {
    pub fn new(message: impl Into<String>, service: &'static str) -> Self {
        Self {
            status: None,
            message: message.into(),
            service,
        }
    }

    /// Build from a status and the (possibly empty) response body.
    pub fn with_status(body: impl Into<String>, service: &'static str, status: StatusCode) -> Self {
        let body = body.into();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            body.trim().to_string()
        };
        Self {
            status: Some(status),
            message,
            service,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.service, status.as_u16(), self.message),
            None => write!(f, "{}: {}", self.service, self.message),
        }
    }
}

impl From<ApiError> for PsaError {
    fn from(error: ApiError) -> Self {
        PsaError::Api {
            service: error.service,
            status: error.status.map(|s| s.as_u16()).unwrap_or(0),
            message: error.message,
        }
    }
}
