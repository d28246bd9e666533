use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::json_resume;
use crate::models::resume::ResumeData;
use crate::store::{self, StoreError};

/// The single shared document every form writes into.
///
/// Mutations hold the write lock for the whole edit-then-persist sequence, so
/// two concurrent edits never interleave and the file always matches memory.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<RwLock<ResumeData>>,
    path: PathBuf,
}

impl DocumentStore {
    /// Loads the persisted document, or the seed file when nothing is persisted yet.
    /// A corrupt persisted document is logged and replaced by the seed/default.
    pub async fn open(path: PathBuf, seed: Option<PathBuf>) -> Result<Self, AppError> {
        let persisted = match store::read_json::<ResumeData>(&path).await {
            Ok(doc) => doc,
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!("Ignoring unreadable document: {e}");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let document = match (persisted, seed) {
            (Some(doc), _) => {
                info!("Loaded document from {}", path.display());
                doc
            }
            (None, Some(seed)) => {
                let bytes = tokio::fs::read(&seed).await.map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Failed to read seed document {}: {e}",
                        seed.display()
                    ))
                })?;
                info!("Seeding document from {}", seed.display());
                json_resume::parse_import(&bytes)?
            }
            (None, None) => ResumeData::default(),
        };

        Ok(Self::with_document(document, path))
    }

    pub fn with_document(document: ResumeData, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
            path,
        }
    }

    pub async fn snapshot(&self) -> ResumeData {
        self.inner.read().await.clone()
    }

    /// Applies `edit` and persists the result. A failed edit leaves both memory and disk untouched.
    pub async fn update<F>(&self, edit: F) -> Result<ResumeData, AppError>
    where
        F: FnOnce(&mut ResumeData) -> Result<(), AppError>,
    {
        let mut guard = self.inner.write().await;
        let mut draft = guard.clone();
        edit(&mut draft)?;
        store::write_json(&self.path, &draft).await?;
        *guard = draft.clone();
        Ok(draft)
    }

    pub async fn replace(&self, document: ResumeData) -> Result<ResumeData, AppError> {
        self.update(move |doc| {
            *doc = document;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::editor;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.json");
        let store = DocumentStore::open(path.clone(), None).await.unwrap();

        store
            .update(|doc| editor::set_field(doc, "name", &json!("Jane Doe")))
            .await
            .unwrap();

        let reopened = DocumentStore::open(path, None).await.unwrap();
        assert_eq!(reopened.snapshot().await.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_failed_edit_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.json");
        let store = DocumentStore::open(path.clone(), None).await.unwrap();

        let result = store
            .update(|doc| {
                doc.name = "Half applied".to_string();
                editor::set_field(doc, "nope", &json!("x"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.snapshot().await.name, "");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_seed_used_when_nothing_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("resume.json");
        tokio::fs::write(&seed, r#"{"basics":{"name":"Seeded","label":"Engineer"}}"#)
            .await
            .unwrap();

        let store = DocumentStore::open(dir.path().join("document.json"), Some(seed))
            .await
            .unwrap();
        let doc = store.snapshot().await;
        assert_eq!(doc.name, "Seeded");
        assert_eq!(doc.position, "Engineer");
    }

    #[tokio::test]
    async fn test_corrupt_document_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = DocumentStore::open(path, None).await.unwrap();
        assert_eq!(store.snapshot().await, ResumeData::default());
    }
}
