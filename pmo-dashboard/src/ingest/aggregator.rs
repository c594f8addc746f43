//! Entity aggregation
//!
//! Builds projects, sustainment items, analysts and categories from parsed
//! rows in two passes: the first creates every entity a row names, the
//! second links tasks, analysts and categories once all names exist.
//!
//! Only roster-listed analysts accumulate workload. An assignee missing from
//! the roster still shows up on project analyst lists, but never becomes an
//! [`Analyst`].

use chrono::NaiveDate;
use pmo_common::time::{is_current_month, is_overdue};
use pmo_common::{Analyst, Category, DemandType, Project, Task, TaskDetail};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::parser::TaskRow;
use super::roster::Roster;

/// Seed value for analysts without a stack or squad
pub const UNDEFINED: &str = "undefined";

const SUSTAINMENT_TAG: &str = "sustentação";
const OVERDUE_MARKER: &str = "Atrasada";
const CURRENT_MONTH_MARKER: &str = "Sim";

/// Output of [`aggregate`]
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub projects: BTreeMap<String, Project>,
    pub sustainment: BTreeMap<String, Project>,
    pub analysts: BTreeMap<String, Analyst>,
    pub categories: BTreeMap<String, Category>,
    pub tasks: Vec<Task>,
    pub analysts_by_role: BTreeMap<String, Vec<Analyst>>,
}

/// Sustainment when tagged so, or when the project name mentions it
pub fn classify(row: &TaskRow) -> DemandType {
    if row.demand_tag.trim().to_lowercase() == SUSTAINMENT_TAG
        || row.project.to_lowercase().contains(SUSTAINMENT_TAG)
    {
        DemandType::Sustainment
    } else {
        DemandType::Project
    }
}

/// Overdue flag: the export column wins when filled, otherwise the end date decides
pub fn task_overdue(row: &TaskRow, today: NaiveDate) -> bool {
    if row.overdue_flag.is_empty() {
        row.end_date.map_or(false, |end| is_overdue(end, today))
    } else {
        row.overdue_flag == OVERDUE_MARKER
    }
}

/// Current-month flag: the export column wins when filled, otherwise the
/// end date (or start date) decides
pub fn task_current_month(row: &TaskRow, today: NaiveDate) -> bool {
    if row.current_month_flag.is_empty() {
        row.end_date
            .or(row.start_date)
            .map_or(false, |date| is_current_month(date, today))
    } else {
        row.current_month_flag == CURRENT_MONTH_MARKER
    }
}

fn seed_project(row: &TaskRow, demand_type: DemandType) -> Project {
    Project {
        name: row.project.clone(),
        owner: row.reporter.clone(),
        squad: row.squad.clone(),
        status: row.status.clone(),
        start_date: row.start_date,
        end_date: row.end_date,
        task_count: 0,
        analysts: Vec::new(),
        tasks: Vec::new(),
        demand_type,
    }
}

fn task_detail(row: &TaskRow) -> TaskDetail {
    TaskDetail {
        title: row.summary.clone(),
        assignee: row.assignee.clone(),
        status: row.status.clone(),
        start_date: row.start_date,
        end_date: row.end_date,
    }
}

fn to_task(row: &TaskRow, demand_type: DemandType, today: NaiveDate) -> Task {
    Task {
        project: row.project.clone(),
        summary: row.summary.clone(),
        item_type: row.item_type.clone(),
        key: row.key.clone(),
        assignee: row.assignee.clone(),
        reporter: row.reporter.clone(),
        start_date: row.start_date,
        end_date: row.end_date,
        status: row.status.clone(),
        squad: row.squad.clone(),
        category: row.category.clone(),
        demand_type,
        overdue: task_overdue(row, today),
        current_month: task_current_month(row, today),
    }
}

/// Case-insensitive name → analyst key
struct AnalystIndex(HashMap<String, String>);

impl AnalystIndex {
    fn resolve(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }
}

fn seed_analysts(roster: &Roster) -> (BTreeMap<String, Analyst>, AnalystIndex) {
    let mut analysts = BTreeMap::new();
    let mut index = HashMap::new();

    for entry in roster.entries() {
        let analyst = Analyst {
            name: entry.name.clone(),
            category: entry
                .stacks
                .first()
                .cloned()
                .unwrap_or_else(|| UNDEFINED.to_string()),
            squad: entry
                .squads
                .first()
                .cloned()
                .unwrap_or_else(|| UNDEFINED.to_string()),
            stacks: entry.stacks.clone(),
            roles: entry.roles.clone(),
            last_task_date: None,
            active_tasks: 0,
            projects: Vec::new(),
        };
        index.insert(entry.name.to_lowercase(), entry.name.clone());
        analysts.insert(entry.name.clone(), analyst);
    }

    (analysts, AnalystIndex(index))
}

/// Build every entity from `rows` and `roster`
///
/// `today` only feeds the per-task overdue/current-month flags.
pub fn aggregate(rows: &[TaskRow], roster: &Roster, today: NaiveDate) -> Aggregation {
    let (mut analysts, index) = seed_analysts(roster);
    let mut projects: BTreeMap<String, Project> = BTreeMap::new();
    let mut sustainment: BTreeMap<String, Project> = BTreeMap::new();
    let mut categories: BTreeMap<String, Category> = BTreeMap::new();

    // Pass 1: create entities
    for row in rows {
        let demand_type = classify(row);
        if !row.project.is_empty() {
            let target = match demand_type {
                DemandType::Project => &mut projects,
                DemandType::Sustainment => &mut sustainment,
            };
            target
                .entry(row.project.clone())
                .or_insert_with(|| seed_project(row, demand_type));
        }

        if !row.category.is_empty() {
            categories
                .entry(row.category.clone())
                .or_insert_with(|| Category::new(row.category.clone()));
        }

        if let Some(key) = index.resolve(&row.assignee) {
            if let Some(analyst) = analysts.get_mut(key) {
                analyst.ratchet_last_task(row.end_date);
            }
        }
    }

    // Pass 2: link tasks, analysts and categories
    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        let demand_type = classify(row);
        let target = match demand_type {
            DemandType::Project => &mut projects,
            DemandType::Sustainment => &mut sustainment,
        };
        if let Some(entity) = target.get_mut(&row.project) {
            entity.link_task(task_detail(row));
        }

        let assignee_key = index.resolve(&row.assignee);
        let reporter_key = index
            .resolve(&row.reporter)
            .filter(|key| Some(*key) != assignee_key);

        for key in [assignee_key, reporter_key].into_iter().flatten() {
            if let Some(analyst) = analysts.get_mut(key) {
                if !row.project.is_empty() && !analyst.projects.contains(&row.project) {
                    analyst.projects.push(row.project.clone());
                }
                analyst.active_tasks += 1;
                analyst.ratchet_last_task(row.end_date);
            }
        }

        if let (Some(key), Some(category)) = (assignee_key, categories.get_mut(&row.category)) {
            category.record(key, row.end_date);
        }

        tasks.push(to_task(row, demand_type, today));
    }

    // Categories declared only through analyst stacks
    for analyst in analysts.values() {
        for stack in &analyst.stacks {
            categories
                .entry(stack.clone())
                .or_insert_with(|| Category::new(stack.clone()));
        }
    }

    let analysts_by_role = group_by_role(&analysts);

    debug!(
        projects = projects.len(),
        sustainment = sustainment.len(),
        analysts = analysts.len(),
        categories = categories.len(),
        tasks = tasks.len(),
        "Aggregated entities"
    );

    Aggregation {
        projects,
        sustainment,
        analysts,
        categories,
        tasks,
        analysts_by_role,
    }
}

/// Bucket analysts by functional role, deduplicated by name
///
/// Analysts without any role are left out of every bucket.
pub fn group_by_role(analysts: &BTreeMap<String, Analyst>) -> BTreeMap<String, Vec<Analyst>> {
    let mut buckets: BTreeMap<String, Vec<Analyst>> = BTreeMap::new();

    for analyst in analysts.values() {
        if analyst.roles.is_empty() {
            warn!(
                analyst = %analyst.name,
                "Analyst has no functional role, excluded from role grouping"
            );
            continue;
        }

        for role in &analyst.roles {
            let bucket = buckets.entry(role.clone()).or_default();
            if !bucket.iter().any(|a| a.name == analyst.name) {
                bucket.push(analyst.clone());
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parser::{parse_line, RowOutcome};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(line: &str) -> TaskRow {
        match parse_line(line) {
            RowOutcome::Parsed(row) => row,
            RowOutcome::Skipped(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    fn has_analyst(agg: &Aggregation, name: &str) -> bool {
        agg.analysts.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    fn roster() -> Roster {
        let mut roster = Roster::default();
        roster.declare("Ana", "Java", "SquadA", "Analista Técnico");
        roster.declare("Ana", "React", "", "");
        roster.declare("Caio", "Go", "SquadB", "");
        roster
    }

    #[test]
    fn test_reference_scenario() {
        let rows = vec![row(
            "Proj X;Fix login;Bug;JIRA-1;Ana;Bob;01/01/2025;15/01/2025;Em Desenvolvimento;SquadA;Java;;;projeto",
        )];
        let agg = aggregate(&rows, &roster(), d(2025, 1, 10));

        let project = &agg.projects["Proj X"];
        assert_eq!(project.task_count, 1);
        assert_eq!(project.analysts, vec!["Ana"]);
        assert_eq!(project.start_date, Some(d(2025, 1, 1)));
        assert_eq!(project.end_date, Some(d(2025, 1, 15)));
        assert_eq!(project.owner, "Bob");

        let ana = &agg.analysts["Ana"];
        assert_eq!(ana.active_tasks, 1);
        assert_eq!(ana.last_task_date, Some(d(2025, 1, 15)));
        assert_eq!(ana.projects, vec!["Proj X"]);
        assert!(!has_analyst(&agg, "Bob"));
    }

    #[test]
    fn test_sustainment_routing_by_name_and_tag() {
        let rows = vec![
            row("Sustentação Portal;Ajuste;Bug;K-1;Ana;Ana;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;"),
            row("Legado;Ajuste;Bug;K-2;Ana;Ana;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;Sustentação"),
            row("Novo App;Tela;Story;K-3;Ana;Ana;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;projeto"),
        ];
        let agg = aggregate(&rows, &roster(), d(2025, 1, 1));

        assert!(agg.sustainment.contains_key("Sustentação Portal"));
        assert!(agg.sustainment.contains_key("Legado"));
        assert!(agg.projects.contains_key("Novo App"));
        assert_eq!(agg.projects.len(), 1);
        assert_eq!(agg.sustainment["Legado"].demand_type, DemandType::Sustainment);
        assert_eq!(agg.tasks[0].demand_type, DemandType::Sustainment);
    }

    #[test]
    fn test_assignee_equal_to_reporter_counts_once() {
        let rows = vec![
            row("P;A;Bug;K-1;Ana;ana;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;projeto"),
            row("P;B;Bug;K-2;Ana;Caio;01/01/2025;03/01/2025;Aberta;SquadA;Java;;;projeto"),
        ];
        let agg = aggregate(&rows, &roster(), d(2025, 1, 1));

        assert_eq!(agg.analysts["Ana"].active_tasks, 2);
        assert_eq!(agg.analysts["Caio"].active_tasks, 1);
        assert_eq!(agg.analysts["Caio"].last_task_date, Some(d(2025, 1, 3)));
    }

    #[test]
    fn test_unknown_assignees_create_no_analysts() {
        let rows = vec![
            row("P;A;Bug;K-1;Zed;Yan;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;projeto"),
            row("Q;B;Bug;K-2;Zed;Zed;01/01/2025;02/01/2025;Aberta;SquadA;Java;;;projeto"),
        ];
        let agg = aggregate(&rows, &roster(), d(2025, 1, 1));

        assert_eq!(agg.analysts.len(), 2);
        assert!(!has_analyst(&agg, "Zed"));
        assert!(!has_analyst(&agg, "Yan"));
        assert!(agg.categories["Java"].analysts.is_empty());
        assert_eq!(agg.projects["P"].analysts, vec!["Zed"]);
    }

    #[test]
    fn test_dates_widen_and_ratchet() {
        let rows = vec![
            row("P;A;Bug;K-1;Ana;X;10/01/2025;20/01/2025;Aberta;SquadA;Java;;;projeto"),
            row("P;B;Bug;K-2;Ana;X;05/01/2025;#VALOR!;Aberta;SquadA;Java;;;projeto"),
            row("P;C;Bug;K-3;Ana;X;;25/01/2025;Aberta;SquadA;Java;;;projeto"),
        ];
        let agg = aggregate(&rows, &roster(), d(2025, 1, 1));

        let project = &agg.projects["P"];
        assert_eq!(project.start_date, Some(d(2025, 1, 5)));
        assert_eq!(project.end_date, Some(d(2025, 1, 25)));
        assert_eq!(project.task_count, 3);
        assert_eq!(project.tasks.len(), 3);
        assert_eq!(agg.analysts["Ana"].last_task_date, Some(d(2025, 1, 25)));

        let java = &agg.categories["Java"];
        assert_eq!(java.analysts.len(), 1);
        assert_eq!(java.analysts[0].task_count, 3);
        assert_eq!(java.analysts[0].latest_date, Some(d(2025, 1, 25)));
    }

    #[test]
    fn test_categories_synthesized_from_stacks() {
        let agg = aggregate(&[], &roster(), d(2025, 1, 1));

        assert_eq!(
            agg.categories.keys().cloned().collect::<Vec<_>>(),
            vec!["Go", "Java", "React"]
        );
        assert!(agg.categories.values().all(|c| c.analysts.is_empty()));
    }

    #[test]
    fn test_seed_defaults_to_undefined() {
        let mut roster = Roster::default();
        roster.declare("Lia", "", "", "");
        let agg = aggregate(&[], &roster, d(2025, 1, 1));

        assert_eq!(agg.analysts["Lia"].category, UNDEFINED);
        assert_eq!(agg.analysts["Lia"].squad, UNDEFINED);
    }

    #[test]
    fn test_role_grouping_excludes_roleless() {
        let mut roster = roster();
        roster.declare("Bia", "Python", "SquadB", "Analista de Negócio");
        roster.declare("Bia", "Python", "SquadB", "Analista Técnico");
        let agg = aggregate(&[], &roster, d(2025, 1, 1));

        let tech: Vec<&str> = agg.analysts_by_role["Analista Técnico"]
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(tech, vec!["Ana", "Bia"]);
        assert_eq!(agg.analysts_by_role["Analista de Negócio"].len(), 1);
        assert!(agg
            .analysts_by_role
            .values()
            .flatten()
            .all(|a| a.name != "Caio"));
    }

    #[test]
    fn test_task_flags_prefer_export_columns() {
        let today = d(2025, 3, 10);
        let flagged = row("P;A;Bug;K;Ana;X;01/03/2025;20/03/2025;Aberta;S;Java;Atrasada;Não;projeto");
        assert!(task_overdue(&flagged, today));
        assert!(!task_current_month(&flagged, today));

        let derived = row("P;A;Bug;K;Ana;X;01/02/2025;09/03/2025;Aberta;S;Java;;;projeto");
        assert!(task_overdue(&derived, today));
        assert!(task_current_month(&derived, today));

        let undated = row("P;A;Bug;K;Ana;X;;;Aberta;S;Java;;;projeto");
        assert!(!task_overdue(&undated, today));
        assert!(!task_current_month(&undated, today));
    }
}
