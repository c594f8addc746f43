//! Append-only per-project comments
//!
//! Comments live in their own JSON file so re-ingestion never touches them.
//! Appends within this process are serialized by a mutex; there is no
//! cross-process locking.

use chrono::{DateTime, Utc};
use pmo_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Longest accepted comment body, in characters
pub const MAX_COMMENT_CHARS: usize = 4000;

/// One comment on a project or sustainment item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "projeto")]
    pub project: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
}

/// JSON-file comment log
#[derive(Debug, Clone)]
pub struct CommentStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CommentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn read_all(&self) -> Result<Vec<Comment>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Comments for `project`, oldest first
    pub async fn list(&self, project: &str) -> Result<Vec<Comment>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|c| c.project == project)
            .collect())
    }

    /// Append a comment and return it
    pub async fn append(&self, project: &str, author: &str, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Comment text is empty".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(Error::InvalidInput(format!(
                "Comment longer than {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let author = author.trim();
        let comment = Comment {
            id: Uuid::new_v4(),
            project: project.to_string(),
            author: if author.is_empty() {
                "anonimo".to_string()
            } else {
                author.to_string()
            },
            text: text.to_string(),
            created_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut comments = self.read_all().await?;
        comments.push(comment.clone());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&comments)?).await?;

        Ok(comment)
    }
}
