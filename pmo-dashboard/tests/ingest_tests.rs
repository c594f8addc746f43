//! Integration tests for the ingestion pipeline against files on disk

use chrono::{NaiveDate, TimeZone, Utc};
use pmo_dashboard::ingest::{ingest, IngestPaths};
use pmo_dashboard::store::{ModelStore, SqliteModelStore};
use tempfile::TempDir;

const HEADER: &str = "Projeto;Resumo;Tipo;Chave;Responsavel;Relator;Inicio;Fim;Status;Squad;Categoria;Atrasada;MesAtual;TipoDemanda";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

fn write_inputs(export_rows: &[&str], roster: &str) -> (TempDir, IngestPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = IngestPaths {
        tasks: dir.path().join("tarefas.csv"),
        roster: dir.path().join("stacks_squads.csv"),
    };

    let mut export = String::from(HEADER);
    for row in export_rows {
        export.push('\n');
        export.push_str(row);
    }
    std::fs::write(&paths.tasks, export).unwrap();
    std::fs::write(&paths.roster, roster).unwrap();

    (dir, paths)
}

#[tokio::test]
async fn test_reference_row_builds_project_and_analyst() {
    let (_dir, paths) = write_inputs(
        &["Proj X;Fix login;Bug;JIRA-1;Ana;Bob;01/01/2025;15/01/2025;Em Desenvolvimento;SquadA;Java;;;projeto"],
        "Nome;Stack;Squad;Funcao\nAna;Java;SquadA;Analista Técnico\n",
    );

    let outcome = ingest(&paths, today(), Utc::now()).await.unwrap();
    let model = outcome.model;

    let project = &model.projects["Proj X"];
    assert_eq!(project.task_count, 1);
    assert_eq!(project.analysts, vec!["Ana"]);

    let ana = &model.analysts["Ana"];
    assert_eq!(ana.active_tasks, 1);
    assert_eq!(ana.last_task_date, NaiveDate::from_ymd_opt(2025, 1, 15));
    assert!(model.find_analyst("bob").is_none());

    assert_eq!(model.metadata.total_projects, 1);
    assert_eq!(model.metadata.total_tasks, 1);
    assert!(outcome.report.tasks_file_found);
}

#[tokio::test]
async fn test_short_rows_are_ignored() {
    let (_dir, paths) = write_inputs(
        &[
            "Proj X;Fix login;Bug;JIRA-1;Ana;Bob;01/01/2025;15/01/2025;Aberta;SquadA;Java;;;projeto",
            "Proj Y;curta;Bug;JIRA-2",
            "",
        ],
        "Nome;Stack;Squad;Funcao\nAna;Java;SquadA;\n",
    );

    let outcome = ingest(&paths, today(), Utc::now()).await.unwrap();

    assert_eq!(outcome.report.rows_parsed, 1);
    assert!(outcome.report.rows_skipped >= 1);
    assert!(!outcome.model.projects.contains_key("Proj Y"));
    assert_eq!(outcome.model.tasks.len(), 1);
}

#[tokio::test]
async fn test_reingestion_is_idempotent() {
    let (_dir, paths) = write_inputs(
        &[
            "Proj X;A;Bug;K-1;Ana;Caio;01/01/2025;15/01/2025;Aberta;SquadA;Java;;;projeto",
            "Sustentação Y;B;Bug;K-2;Caio;Caio;05/01/2025;20/01/2025;Aberta;SquadB;Go;;;",
        ],
        "Nome;Stack;Squad;Funcao\nAna;Java;SquadA;Dev\nCaio;Go;SquadB;Dev\n",
    );

    let first_at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
    let second_at = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();

    let first = ingest(&paths, today(), first_at).await.unwrap().model;
    let mut second = ingest(&paths, today(), second_at).await.unwrap().model;

    assert_ne!(first.metadata.last_updated, second.metadata.last_updated);
    second.metadata.last_updated = first.metadata.last_updated;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_export_yields_empty_model() {
    let dir = tempfile::tempdir().unwrap();
    let paths = IngestPaths {
        tasks: dir.path().join("tarefas.csv"),
        roster: dir.path().join("stacks_squads.csv"),
    };

    let outcome = ingest(&paths, today(), Utc::now()).await.unwrap();

    assert!(!outcome.report.tasks_file_found);
    assert!(outcome.model.projects.is_empty());
    assert!(outcome.model.analysts.is_empty());
}

#[tokio::test]
async fn test_ingested_model_persists_in_sqlite() {
    let (dir, paths) = write_inputs(
        &["Proj X;A;Bug;K-1;Ana;Ana;01/01/2025;15/01/2025;Aberta;SquadA;Java;;;projeto"],
        "Nome;Stack;Squad;Funcao\nAna;Java;SquadA;Dev\n",
    );

    let model = ingest(&paths, today(), Utc::now()).await.unwrap().model;
    let store = SqliteModelStore::open(&dir.path().join("pmo.db")).await.unwrap();
    store.save(&model).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded, model);
    assert_eq!(loaded.analysts_by_role["Dev"][0].name, "Ana");
}
