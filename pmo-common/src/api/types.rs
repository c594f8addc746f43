//! Shared API response envelope
//!
//! Every endpoint answers `{success, data?, message?}` so the dashboards can
//! show `message` instead of a stack trace when something fails.

use serde::{Deserialize, Serialize};

/// Response envelope for all endpoints
///
/// # Examples
///
/// ```
/// use pmo_common::api::types::ApiResponse;
///
/// let ok = ApiResponse::ok(vec![1, 2, 3]);
/// assert!(ok.success);
///
/// let failed = ApiResponse::<()>::error("Model not found");
/// assert!(!failed.success);
/// assert_eq!(failed.message.as_deref(), Some("Model not found"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful response carrying `data` and a human-readable note
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// Failed response with a human-readable message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}
