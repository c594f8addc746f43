//! Query-time rollups for the dashboards
//!
//! Pure functions over a loaded [`DashboardModel`] and an injected `today`:
//! project progress, analyst availability, the indicator summary and the
//! weekly planning grid.

use chrono::{Duration, NaiveDate};
use pmo_common::time::{
    classify_period, days_until, duration_days, is_available, is_overdue, project_progress,
    week_start,
};
use pmo_common::{Analyst, DashboardModel, Project, Task};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ingest::aggregator::UNDEFINED;

/// Working days shown by the planning calendar
const PLANNING_DAYS: i64 = 5;

/// Project or sustainment item with derived schedule fields
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    #[serde(rename = "progresso")]
    pub progress: f64,
    #[serde(rename = "duracao")]
    pub duration_days: Option<i64>,
    #[serde(rename = "diasRestantes")]
    pub days_left: Option<i64>,
    #[serde(rename = "atrasado")]
    pub overdue: bool,
}

pub fn project_view(project: &Project, today: NaiveDate) -> ProjectView {
    let progress = match (project.start_date, project.end_date) {
        (Some(start), Some(end)) => (project_progress(start, end, today) * 10.0).round() / 10.0,
        _ => 0.0,
    };

    ProjectView {
        project: project.clone(),
        progress,
        duration_days: project
            .start_date
            .zip(project.end_date)
            .map(|(start, end)| duration_days(start, end)),
        days_left: project.end_date.map(|end| days_until(end, today)),
        overdue: project.end_date.map_or(false, |end| is_overdue(end, today)),
    }
}

/// Analyst with derived availability
#[derive(Debug, Clone, Serialize)]
pub struct AnalystView {
    #[serde(flatten)]
    pub analyst: Analyst,
    #[serde(rename = "disponivel")]
    pub available: bool,
    #[serde(rename = "diasAteLivre")]
    pub days_until_free: i64,
}

pub fn analyst_view(analyst: &Analyst, today: NaiveDate) -> AnalystView {
    AnalystView {
        analyst: analyst.clone(),
        available: is_available(analyst.last_task_date, today),
        days_until_free: analyst
            .last_task_date
            .map_or(0, |date| days_until(date, today)),
    }
}

/// Indicator dashboard summary
#[derive(Debug, Clone, Serialize)]
pub struct Indicators {
    #[serde(rename = "totalProjetos")]
    pub total_projects: usize,
    #[serde(rename = "totalSustentacoes")]
    pub total_sustainment: usize,
    #[serde(rename = "totalTarefas")]
    pub total_tasks: usize,
    #[serde(rename = "totalAnalistas")]
    pub total_analysts: usize,
    #[serde(rename = "tarefasAtrasadas")]
    pub overdue_tasks: usize,
    #[serde(rename = "tarefasMesAtual")]
    pub current_month_tasks: usize,
    #[serde(rename = "projetosAtrasados")]
    pub overdue_projects: usize,
    #[serde(rename = "analistasDisponiveis")]
    pub available_analysts: usize,
    #[serde(rename = "analistasOcupados")]
    pub busy_analysts: usize,
    #[serde(rename = "porStatus")]
    pub by_status: BTreeMap<String, usize>,
    #[serde(rename = "porSquad")]
    pub by_squad: BTreeMap<String, usize>,
    #[serde(rename = "porCategoria")]
    pub by_category: BTreeMap<String, usize>,
    #[serde(rename = "porPeriodo")]
    pub by_period: BTreeMap<String, usize>,
}

fn label(value: &str) -> String {
    if value.trim().is_empty() {
        UNDEFINED.to_string()
    } else {
        value.to_string()
    }
}

pub fn indicators(model: &DashboardModel, today: NaiveDate) -> Indicators {
    let mut by_status = BTreeMap::new();
    let mut by_squad = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    let mut by_period = BTreeMap::new();

    for task in &model.tasks {
        *by_status.entry(label(&task.status)).or_insert(0) += 1;
        *by_squad.entry(label(&task.squad)).or_insert(0) += 1;
        *by_category.entry(label(&task.category)).or_insert(0) += 1;
        *by_period
            .entry(classify_period(task.end_date, today).as_str().to_string())
            .or_insert(0) += 1;
    }

    let available_analysts = model
        .analysts
        .values()
        .filter(|a| is_available(a.last_task_date, today))
        .count();

    let overdue_projects = model
        .projects
        .values()
        .chain(model.sustainment.values())
        .filter(|p| p.end_date.map_or(false, |end| is_overdue(end, today)))
        .count();

    Indicators {
        total_projects: model.projects.len(),
        total_sustainment: model.sustainment.len(),
        total_tasks: model.tasks.len(),
        total_analysts: model.analysts.len(),
        overdue_tasks: model.tasks.iter().filter(|t| t.overdue).count(),
        current_month_tasks: model.tasks.iter().filter(|t| t.current_month).count(),
        overdue_projects,
        available_analysts,
        busy_analysts: model.analysts.len() - available_analysts,
        by_status,
        by_squad,
        by_category,
        by_period,
    }
}

/// Task entry on the planning calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTask {
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(rename = "resumo")]
    pub summary: String,
    #[serde(rename = "projeto")]
    pub project: String,
    pub status: String,
}

/// One weekday column: assignee → tasks scheduled that day
#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "analistas")]
    pub by_assignee: BTreeMap<String, Vec<PlannedTask>>,
}

/// Monday-to-Friday planning grid
#[derive(Debug, Clone, Serialize)]
pub struct WeekPlan {
    #[serde(rename = "inicio")]
    pub start: NaiveDate,
    #[serde(rename = "fim")]
    pub end: NaiveDate,
    #[serde(rename = "dias")]
    pub days: Vec<DayPlan>,
}

/// Tasks whose date range covers each weekday of the week containing `day`
///
/// A task with only one date occupies that single day; undated tasks are left out.
pub fn weekly_plan(tasks: &[Task], day: NaiveDate) -> WeekPlan {
    let start = week_start(day);
    let end = start + Duration::days(PLANNING_DAYS - 1);

    let days = (0..PLANNING_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let mut by_assignee: BTreeMap<String, Vec<PlannedTask>> = BTreeMap::new();

            for task in tasks {
                let (Some(first), Some(last)) = (
                    task.start_date.or(task.end_date),
                    task.end_date.or(task.start_date),
                ) else {
                    continue;
                };

                if first <= date && date <= last {
                    by_assignee
                        .entry(label(&task.assignee))
                        .or_default()
                        .push(PlannedTask {
                            key: task.key.clone(),
                            summary: task.summary.clone(),
                            project: task.project.clone(),
                            status: task.status.clone(),
                        });
                }
            }

            DayPlan { date, by_assignee }
        })
        .collect();

    WeekPlan { start, end, days }
}
