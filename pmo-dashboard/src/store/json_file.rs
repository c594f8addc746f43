//! Whole-model JSON file backend

use async_trait::async_trait;
use pmo_common::{DashboardModel, Result};
use std::path::PathBuf;
use tracing::debug;

use super::ModelStore;

/// Stores the model as one JSON document at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFileModelStore {
    path: PathBuf,
}

impl JsonFileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelStore for JsonFileModelStore {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(parent) => tokio::fs::create_dir_all(parent).await.is_ok(),
            None => true,
        }
    }

    async fn save(&self, model: &DashboardModel) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(model)?;
        tokio::fs::write(&self.path, bytes).await?;

        debug!("Wrote model to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<DashboardModel>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_common::Error;

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileModelStore::new(dir.path().join("dados.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("dados.json");
        let store = JsonFileModelStore::new(&path);

        let model = DashboardModel::empty(pmo_common::time::now());
        store.save(&model).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.load().await.unwrap(), Some(model));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.json");
        std::fs::write(&path, "{\"projetos\": ").unwrap();

        let store = JsonFileModelStore::new(&path);
        assert!(matches!(store.load().await, Err(Error::Json(_))));
    }
}
