//! Domain model produced by ingestion and served by the API
//!
//! Field names on the wire (and in the persisted document) follow the
//! Portuguese vocabulary of the timesheet export: `projetos`, `analistas`,
//! `dataInicio`, and so on. Rust-side names are English.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether work is new-build or maintenance of a system in production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandType {
    #[serde(rename = "projeto")]
    Project,
    #[serde(rename = "sustentacao")]
    Sustainment,
}

impl DemandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandType::Project => "projeto",
            DemandType::Sustainment => "sustentacao",
        }
    }

    /// Parse the query-string form (`projeto` / `sustentacao`)
    pub fn from_query(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "projeto" | "project" => Some(DemandType::Project),
            "sustentacao" | "sustentação" | "sustainment" => Some(DemandType::Sustainment),
            _ => None,
        }
    }
}

/// One unit of work extracted from a timesheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "projeto")]
    pub project: String,
    #[serde(rename = "resumo")]
    pub summary: String,
    #[serde(rename = "tipoItem")]
    pub item_type: String,
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(rename = "responsavel")]
    pub assignee: String,
    #[serde(rename = "relator")]
    pub reporter: String,
    #[serde(rename = "dataInicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "dataFim")]
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub squad: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "tipoDemanda")]
    pub demand_type: DemandType,
    #[serde(rename = "atrasada")]
    pub overdue: bool,
    #[serde(rename = "mesAtual")]
    pub current_month: bool,
}

/// Task summary attached to its project or sustainment item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "responsavel")]
    pub assignee: String,
    pub status: String,
    #[serde(rename = "dataInicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "dataFim")]
    pub end_date: Option<NaiveDate>,
}

/// A project or a sustainment item, keyed by name
///
/// Start and end dates are the min/max over every linked task, and
/// `task_count` always equals `tasks.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "responsavel")]
    pub owner: String,
    pub squad: String,
    pub status: String,
    #[serde(rename = "dataInicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "dataFim")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "totalTarefas")]
    pub task_count: u32,
    #[serde(rename = "analistas")]
    pub analysts: Vec<String>,
    #[serde(rename = "tarefas")]
    pub tasks: Vec<TaskDetail>,
    #[serde(rename = "tipoDemanda")]
    pub demand_type: DemandType,
}

/// Sustainment items share the project shape; only the demand type differs
pub type SustainmentItem = Project;

impl Project {
    /// Widen the date range so it covers `start..=end`
    pub fn widen_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let Some(start) = start {
            if self.start_date.map_or(true, |current| start < current) {
                self.start_date = Some(start);
            }
        }
        if let Some(end) = end {
            if self.end_date.map_or(true, |current| end > current) {
                self.end_date = Some(end);
            }
        }
    }

    /// Append a task and its assignee, keeping `task_count` in step
    pub fn link_task(&mut self, detail: TaskDetail) {
        self.widen_dates(detail.start_date, detail.end_date);
        if !detail.assignee.is_empty() && !self.analysts.contains(&detail.assignee) {
            self.analysts.push(detail.assignee.clone());
        }
        self.tasks.push(detail);
        self.task_count += 1;
    }
}

/// A roster-listed analyst and the workload accumulated from task rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyst {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    pub squad: String,
    pub stacks: Vec<String>,
    #[serde(rename = "funcoes")]
    pub roles: Vec<String>,
    /// End date of the latest scheduled task
    #[serde(rename = "dataUltimaTarefa")]
    pub last_task_date: Option<NaiveDate>,
    #[serde(rename = "tarefasAtivas")]
    pub active_tasks: u32,
    #[serde(rename = "projetos")]
    pub projects: Vec<String>,
}

impl Analyst {
    /// Move `last_task_date` forward; a missing date never moves it
    pub fn ratchet_last_task(&mut self, end: Option<NaiveDate>) {
        if let Some(end) = end {
            if self.last_task_date.map_or(true, |current| end > current) {
                self.last_task_date = Some(end);
            }
        }
    }
}

/// Per-analyst workload inside a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalyst {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data")]
    pub latest_date: Option<NaiveDate>,
    #[serde(rename = "tarefas")]
    pub task_count: u32,
}

/// A technology/stack label and the analysts working in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "analistas")]
    pub analysts: Vec<CategoryAnalyst>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analysts: Vec::new(),
        }
    }

    /// Count one more task for `analyst`, ratcheting its date forward
    pub fn record(&mut self, analyst: &str, end: Option<NaiveDate>) {
        match self.analysts.iter_mut().find(|a| a.name == analyst) {
            Some(entry) => {
                entry.task_count += 1;
                if let Some(end) = end {
                    if entry.latest_date.map_or(true, |current| end > current) {
                        entry.latest_date = Some(end);
                    }
                }
            }
            None => self.analysts.push(CategoryAnalyst {
                name: analyst.to_string(),
                latest_date: end,
                task_count: 1,
            }),
        }
    }
}

/// Entity counts and refresh time of a persisted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "totalProjetos")]
    pub total_projects: usize,
    #[serde(rename = "totalAnalistas")]
    pub total_analysts: usize,
    #[serde(rename = "totalCategorias")]
    pub total_categories: usize,
    #[serde(rename = "totalSustentacoes")]
    pub total_sustainment: usize,
    #[serde(rename = "totalTarefas")]
    pub total_tasks: usize,
    #[serde(rename = "ultimaAtualizacao")]
    pub last_updated: DateTime<Utc>,
}

/// The whole aggregated model, as persisted and as served by `/api/dados`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardModel {
    #[serde(rename = "projetos")]
    pub projects: BTreeMap<String, Project>,
    #[serde(rename = "analistas")]
    pub analysts: BTreeMap<String, Analyst>,
    #[serde(rename = "categorias")]
    pub categories: BTreeMap<String, Category>,
    #[serde(rename = "sustentacoes")]
    pub sustainment: BTreeMap<String, SustainmentItem>,
    #[serde(rename = "tarefas")]
    pub tasks: Vec<Task>,
    #[serde(rename = "analistasPorFuncao")]
    pub analysts_by_role: BTreeMap<String, Vec<Analyst>>,
    pub metadata: Metadata,
}

impl DashboardModel {
    /// Model with no entities, stamped at `updated_at`
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        let mut model = Self {
            projects: BTreeMap::new(),
            analysts: BTreeMap::new(),
            categories: BTreeMap::new(),
            sustainment: BTreeMap::new(),
            tasks: Vec::new(),
            analysts_by_role: BTreeMap::new(),
            metadata: Metadata {
                total_projects: 0,
                total_analysts: 0,
                total_categories: 0,
                total_sustainment: 0,
                total_tasks: 0,
                last_updated: updated_at,
            },
        };
        model.refresh_metadata(updated_at);
        model
    }

    /// Recompute entity counts and stamp the update time
    pub fn refresh_metadata(&mut self, updated_at: DateTime<Utc>) {
        self.metadata = Metadata {
            total_projects: self.projects.len(),
            total_analysts: self.analysts.len(),
            total_categories: self.categories.len(),
            total_sustainment: self.sustainment.len(),
            total_tasks: self.tasks.len(),
            last_updated: updated_at,
        };
    }

    /// Case-insensitive analyst lookup
    pub fn find_analyst(&self, name: &str) -> Option<&Analyst> {
        let needle = name.trim().to_lowercase();
        self.analysts
            .values()
            .find(|analyst| analyst.name.to_lowercase() == needle)
    }
}
