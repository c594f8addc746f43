//! SQLite document-store backend
//!
//! Each collection is cleared and re-inserted on save; there is no upsert or
//! diff. Documents are JSON text, one row per entity.

use async_trait::async_trait;
use pmo_common::db::{init_database, ping};
use pmo_common::{DashboardModel, Metadata, Result, Task};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::ModelStore;

/// Model persisted as JSON documents in SQLite tables
#[derive(Debug, Clone)]
pub struct SqliteModelStore {
    pool: SqlitePool,
}

impl SqliteModelStore {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Ok(Self { pool })
    }

    async fn replace_collection(
        &self,
        table: &str,
        documents: Vec<(String, String)>,
    ) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&self.pool)
            .await?;

        let written = documents.len();
        for (position, (key, document)) in documents.into_iter().enumerate() {
            sqlx::query(&format!(
                "INSERT INTO {} (position, key, document) VALUES (?, ?, ?)",
                table
            ))
            .bind(position as i64)
            .bind(key)
            .bind(document)
            .execute(&self.pool)
            .await?;
        }

        debug!(collection = table, documents = written, "Replaced collection");
        Ok(())
    }

    async fn read_collection<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<(String, T)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(&format!(
            "SELECT key, document FROM {} ORDER BY position",
            table
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(key, document)| Ok((key, serde_json::from_str(&document)?)))
            .collect()
    }

    async fn read_map<T: DeserializeOwned>(&self, table: &str) -> Result<BTreeMap<String, T>> {
        Ok(self.read_collection(table).await?.into_iter().collect())
    }
}

/// Serialize a keyed collection into `(key, json)` rows, in key order
fn documents<T: Serialize>(items: &BTreeMap<String, T>) -> Result<Vec<(String, String)>> {
    items
        .iter()
        .map(|(key, item)| Ok((key.clone(), serde_json::to_string(item)?)))
        .collect()
}

fn task_documents(tasks: &[Task]) -> Result<Vec<(String, String)>> {
    tasks
        .iter()
        .map(|task| Ok((task.key.clone(), serde_json::to_string(task)?)))
        .collect()
}

#[async_trait]
impl ModelStore for SqliteModelStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn is_available(&self) -> bool {
        ping(&self.pool).await
    }

    async fn save(&self, model: &DashboardModel) -> Result<()> {
        self.replace_collection("projetos", documents(&model.projects)?)
            .await?;
        self.replace_collection("sustentacoes", documents(&model.sustainment)?)
            .await?;
        self.replace_collection("analistas", documents(&model.analysts)?)
            .await?;
        self.replace_collection("categorias", documents(&model.categories)?)
            .await?;
        self.replace_collection("tarefas", task_documents(&model.tasks)?)
            .await?;
        self.replace_collection(
            "analistas_por_funcao",
            documents(&model.analysts_by_role)?,
        )
        .await?;

        let metadata = serde_json::to_string(&model.metadata)?;
        sqlx::query(
            "INSERT INTO metadata (id, document, updated_at) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at",
        )
        .bind(metadata)
        .bind(model.metadata.last_updated.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<DashboardModel>> {
        let metadata: Option<String> =
            sqlx::query_scalar("SELECT document FROM metadata WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let Some(metadata) = metadata else {
            return Ok(None);
        };
        let metadata: Metadata = serde_json::from_str(&metadata)?;

        let tasks = self
            .read_collection("tarefas")
            .await?
            .into_iter()
            .map(|(_, task)| task)
            .collect();

        Ok(Some(DashboardModel {
            projects: self.read_map("projetos").await?,
            analysts: self.read_map("analistas").await?,
            categories: self.read_map("categorias").await?,
            sustainment: self.read_map("sustentacoes").await?,
            tasks,
            analysts_by_role: self.read_map("analistas_por_funcao").await?,
            metadata,
        }))
    }
}
