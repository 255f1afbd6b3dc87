//! In-memory document service
//!
//! HashMap-backed stand-in for the remote document store and activity feed.
//! Each instance owns its state, so tests construct one per case. Clones share
//! state, which lets a test keep a handle for assertions after handing the
//! service to a [`crate::PersistenceBridge`].
//!
//! Failure injection and artificial latency cover the error and timeout paths.

use crate::service::{Activity, ActivityLog, DocumentPayload, DocumentService, ServiceError, StoredDocument};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedActivity {
    pub activity: Activity,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, StoredDocument>,
    activities: Vec<RecordedActivity>,
    /// Counter for deterministic ids
    next_id: u64,
    create_calls: usize,
    update_calls: usize,
    /// Returned by the next create/update, then cleared
    fail_next_save: Option<ServiceError>,
    /// Returned by every activity call while set
    activity_failure: Option<ServiceError>,
    latency: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentService {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` (tokio time, so paused clocks apply)
    pub fn with_latency(self, latency: Duration) -> Self {
        self.write().latency = Some(latency);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fail_next_save(&self, error: ServiceError) {
        self.write().fail_next_save = Some(error);
    }

    pub fn set_activity_failure(&self, error: Option<ServiceError>) {
        self.write().activity_failure = error;
    }

    /// Seed a stored document
    pub fn insert(&self, document: StoredDocument) {
        self.write()
            .documents
            .insert(document.id.clone(), document);
    }

    pub fn document(&self, id: &str) -> Option<StoredDocument> {
        self.read().documents.get(id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.read().documents.len()
    }

    pub fn activities(&self) -> Vec<RecordedActivity> {
        self.read().activities.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.read().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.read().update_calls
    }

    pub fn save_calls(&self) -> usize {
        let state = self.read();
        state.create_calls + state.update_calls
    }

    async fn simulate_latency(&self) {
        let latency = self.read().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn stored(id: String, payload: DocumentPayload) -> StoredDocument {
        StoredDocument {
            id,
            title: payload.title,
            blocks: payload.blocks,
            last_modified: Utc::now(),
            preview: payload.preview,
        }
    }
}

#[async_trait]
impl DocumentService for MemoryDocumentService {
    async fn create_document(
        &self,
        payload: DocumentPayload,
    ) -> Result<StoredDocument, ServiceError> {
        self.simulate_latency().await;

        let mut state = self.write();
        state.create_calls += 1;
        if let Some(error) = state.fail_next_save.take() {
            return Err(error);
        }

        state.next_id += 1;
        let document = Self::stored(format!("doc-{}", state.next_id), payload);
        state
            .documents
            .insert(document.id.clone(), document.clone());

        tracing::debug!(id = %document.id, "Created document in memory");
        Ok(document)
    }

    async fn update_document(
        &self,
        id: &str,
        payload: DocumentPayload,
    ) -> Result<StoredDocument, ServiceError> {
        self.simulate_latency().await;

        let mut state = self.write();
        state.update_calls += 1;
        if let Some(error) = state.fail_next_save.take() {
            return Err(error);
        }

        if !state.documents.contains_key(id) {
            return Err(ServiceError::document_not_found(id));
        }

        let document = Self::stored(id.to_string(), payload);
        state.documents.insert(id.to_string(), document.clone());
        Ok(document)
    }

    async fn get_document_by_id(&self, id: &str) -> Result<StoredDocument, ServiceError> {
        self.simulate_latency().await;

        self.read()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::document_not_found(id))
    }
}

#[async_trait]
impl ActivityLog for MemoryDocumentService {
    async fn create_activity(&self, activity: Activity) -> Result<(), ServiceError> {
        let mut state = self.write();
        if let Some(error) = &state.activity_failure {
            return Err(error.clone());
        }

        state.activities.push(RecordedActivity {
            activity,
            at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockKind};
    use crate::service::ActivityAction;

    fn payload(title: &str) -> DocumentPayload {
        DocumentPayload {
            title: title.to_string(),
            blocks: vec![Block::new("block-1", BlockKind::Paragraph).with_content("Hi")],
            preview: "Hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let service = MemoryDocumentService::new();

        let created = service.create_document(payload("One")).await.unwrap();
        assert_eq!(created.id, "doc-1");

        let updated = service
            .update_document(&created.id, payload("Two"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Two");
        assert_eq!(service.document("doc-1").unwrap().title, "Two");
        assert_eq!((service.create_calls(), service.update_calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let service = MemoryDocumentService::new();

        assert_eq!(
            service.get_document_by_id("nope").await,
            Err(ServiceError::document_not_found("nope"))
        );
        assert!(service.update_document("nope", payload("x")).await.is_err());
        assert_eq!(service.document_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_next_save_is_one_shot() {
        let service = MemoryDocumentService::new();
        service.fail_next_save(ServiceError::Unavailable("down".into()));

        assert!(service.create_document(payload("a")).await.is_err());
        assert!(service.create_document(payload("a")).await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let service = MemoryDocumentService::new();
        let handle = service.clone();

        service
            .create_activity(Activity {
                action: ActivityAction::Creation,
                document_id: "doc-1".into(),
                document_title: "T".into(),
                user: "user-1".into(),
            })
            .await
            .unwrap();

        assert_eq!(handle.activities().len(), 1);
    }
}
