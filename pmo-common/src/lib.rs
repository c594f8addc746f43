//! # PMO Common Library
//!
//! Shared code for the PMO dashboard service:
//! - Domain model (tasks, projects, sustainment items, analysts, categories)
//! - Date calculations used by ingestion and by the API
//! - API response envelope
//! - Configuration loading and root folder resolution
//! - Document-store (SQLite) initialization

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::{
    Analyst, Category, CategoryAnalyst, DashboardModel, DemandType, Metadata, Project,
    SustainmentItem, Task, TaskDetail,
};
