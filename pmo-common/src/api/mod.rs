//! API module for shared HTTP API functionality
//!
//! Contains ONLY framework-independent types. The service wraps these with
//! its Axum handlers and error conversion.

pub mod types;

pub use types::ApiResponse;
