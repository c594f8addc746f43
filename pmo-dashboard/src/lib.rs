//! pmo-dashboard library - PMO reporting service
//!
//! Ingests the timesheet export and analyst roster, persists the aggregated
//! model, and serves it to the capacity, indicator and planning dashboards.

use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use pmo_common::{DashboardModel, Metadata};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod api;
pub mod comments;
pub mod error;
pub mod ingest;
pub mod pagination;
pub mod reports;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::comments::CommentStore;
use crate::ingest::{IngestPaths, IngestReport};
use crate::store::ModelStore;

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend selected at startup
    pub store: Arc<dyn ModelStore>,
    /// Append-only comment log
    pub comments: CommentStore,
    /// Fixed input file locations used by reprocess and upload
    pub inputs: IngestPaths,
    /// Largest accepted upload per file, in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last ingestion/persistence error, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
    clock: Clock,
}

/// What a reprocess run produced
#[derive(Debug, Clone, Serialize)]
pub struct ReprocessSummary {
    pub metadata: Metadata,
    #[serde(rename = "relatorio")]
    pub report: IngestReport,
    #[serde(rename = "armazenamento")]
    pub storage: &'static str,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ModelStore>,
        comments: CommentStore,
        inputs: IngestPaths,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            comments,
            inputs,
            max_upload_bytes,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
            clock: Arc::new(pmo_common::time::today),
        }
    }

    /// Pin "today" for reproducible date-derived fields
    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.clock = Arc::new(move || today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Persisted model, or an empty one when nothing has been ingested yet
    pub async fn model_or_empty(&self) -> pmo_common::Result<DashboardModel> {
        Ok(self
            .store
            .load()
            .await?
            .unwrap_or_else(|| DashboardModel::empty(self.startup_time)))
    }

    /// Re-run ingestion against the fixed input paths and replace the model
    pub async fn reprocess(&self) -> pmo_common::Result<ReprocessSummary> {
        let result = async {
            let outcome =
                ingest::ingest(&self.inputs, self.today(), pmo_common::time::now()).await?;
            self.store.save(&outcome.model).await?;
            Ok::<_, pmo_common::Error>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                *self.last_error.write().await = None;
                info!(
                    storage = self.store.name(),
                    tasks = outcome.model.metadata.total_tasks,
                    "Model reprocessed"
                );
                Ok(ReprocessSummary {
                    metadata: outcome.model.metadata,
                    report: outcome.report,
                    storage: self.store.name(),
                })
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .merge(api::model_routes())
        .merge(api::project_routes())
        .merge(api::analyst_routes())
        .merge(api::category_routes())
        .merge(api::task_routes())
        .merge(api::dashboard_routes())
        .merge(api::comment_routes())
        .merge(api::ingest_routes(state.max_upload_bytes))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
