//! Document-store initialization
//!
//! Each model collection is one table of JSON documents:
//! `(position INTEGER PRIMARY KEY, key TEXT, document TEXT)`.
//! Table creation is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Collection tables, in the order they are written
pub const COLLECTIONS: [&str; 6] = [
    "projetos",
    "sustentacoes",
    "analistas",
    "categorias",
    "tarefas",
    "analistas_por_funcao",
];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create collection and metadata tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for collection in COLLECTIONS {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                position INTEGER PRIMARY KEY,
                key TEXT NOT NULL,
                document TEXT NOT NULL
            )",
            collection
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS metadata (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            document TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Lightweight connectivity probe; never returns an error
pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
