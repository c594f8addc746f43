//! Ingestion pipeline: export text + roster → [`DashboardModel`]
//!
//! Runs once per upload or reprocess request. The model is always rebuilt
//! from scratch; nothing is updated incrementally.

pub mod aggregator;
pub mod parser;
pub mod roster;

use chrono::{DateTime, NaiveDate, Utc};
use pmo_common::{DashboardModel, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use aggregator::{aggregate, Aggregation};
pub use parser::{parse_date, parse_export, parse_line, RowOutcome, SkipReason, TaskRow};
pub use roster::{Roster, RosterEntry};

/// Fixed locations of the two input files
#[derive(Debug, Clone)]
pub struct IngestPaths {
    pub tasks: PathBuf,
    pub roster: PathBuf,
}

/// What one ingestion run consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    #[serde(rename = "linhasProcessadas")]
    pub rows_parsed: usize,
    #[serde(rename = "linhasIgnoradas")]
    pub rows_skipped: usize,
    #[serde(rename = "analistasNoCadastro")]
    pub roster_size: usize,
    #[serde(rename = "arquivoEncontrado")]
    pub tasks_file_found: bool,
}

/// Result of an ingestion run
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub model: DashboardModel,
    pub report: IngestReport,
}

impl From<Aggregation> for DashboardModel {
    fn from(agg: Aggregation) -> Self {
        let mut model = DashboardModel::empty(DateTime::<Utc>::UNIX_EPOCH);
        model.projects = agg.projects;
        model.sustainment = agg.sustainment;
        model.analysts = agg.analysts;
        model.categories = agg.categories;
        model.tasks = agg.tasks;
        model.analysts_by_role = agg.analysts_by_role;
        model
    }
}

/// Build a model from in-memory inputs
pub fn build_model(
    export_text: &str,
    roster: &Roster,
    today: NaiveDate,
    updated_at: DateTime<Utc>,
) -> IngestOutcome {
    let export = parse_export(export_text);
    for skipped in &export.skipped {
        debug!(line = skipped.line, reason = ?skipped.reason, "Skipped export line");
    }

    let aggregation = aggregate(&export.rows, roster, today);
    let mut model = DashboardModel::from(aggregation);
    model.refresh_metadata(updated_at);

    IngestOutcome {
        model,
        report: IngestReport {
            rows_parsed: export.rows.len(),
            rows_skipped: export.skipped.len(),
            roster_size: roster.len(),
            tasks_file_found: true,
        },
    }
}

async fn read_export(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read both input files and build the model
///
/// A missing export or roster degrades to empty input instead of failing.
pub async fn ingest(
    paths: &IngestPaths,
    today: NaiveDate,
    updated_at: DateTime<Utc>,
) -> Result<IngestOutcome> {
    let roster = Roster::load(&paths.roster).await;

    let export = read_export(&paths.tasks).await?;
    if export.is_none() {
        warn!(
            "Task export {} not found, building model without tasks",
            paths.tasks.display()
        );
    }

    let mut outcome = build_model(export.as_deref().unwrap_or(""), &roster, today, updated_at);
    outcome.report.tasks_file_found = export.is_some();

    info!(
        rows = outcome.report.rows_parsed,
        skipped = outcome.report.rows_skipped,
        projects = outcome.model.metadata.total_projects,
        sustainment = outcome.model.metadata.total_sustainment,
        analysts = outcome.model.metadata.total_analysts,
        "Ingestion finished"
    );

    Ok(outcome)
}
