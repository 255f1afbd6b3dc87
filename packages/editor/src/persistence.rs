//! # Persistence Bridge
//!
//! Moves editor state to and from the document service.
//!
//! ```text
//! save:  begin_save (snapshot) ─▶ create/update ─▶ activity ─▶ complete_save
//! load:  get_document_by_id ─▶ replace_with
//! ```
//!
//! [`PersistenceBridge::save_snapshot`] takes only the snapshot, so callers
//! that share the document behind a lock (autosave) release the lock for the
//! duration of the remote calls. Every remote call is bounded by the
//! configured timeout.

use crate::config::EditorConfig;
use crate::document::{EditorDocument, SaveReceipt, SaveRequest};
use crate::errors::{EditorError, Result};
use crate::service::{Activity, ActivityAction, ActivityLog, DocumentService, TemplateProvider};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct PersistenceBridge {
    documents: Arc<dyn DocumentService>,
    activity: Arc<dyn ActivityLog>,
    templates: Option<Arc<dyn TemplateProvider>>,
    user: String,
    timeout: Duration,
}

impl PersistenceBridge {
    pub fn new(documents: Arc<dyn DocumentService>, activity: Arc<dyn ActivityLog>) -> Self {
        let config = EditorConfig::default();
        Self {
            documents,
            activity,
            templates: None,
            user: config.user_id.clone(),
            timeout: config.save_timeout(),
        }
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateProvider>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.user = config.user_id.clone();
        self.timeout = config.save_timeout();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, crate::service::ServiceError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(EditorError::Timeout {
                operation,
                after: self.timeout,
            }),
        }
    }

    /// Save `doc` and return its remote id
    pub async fn save(&self, doc: &mut EditorDocument) -> Result<String> {
        let request = doc.begin_save().ok_or(EditorError::SaveInProgress)?;
        let generation = request.generation;

        match self.save_snapshot(request).await {
            Ok(receipt) => {
                doc.complete_save(&receipt);
                Ok(receipt.document_id)
            }
            Err(e) => {
                doc.fail_save(generation, &e);
                Err(e)
            }
        }
    }

    /// Push a snapshot to the service. Does not touch the document.
    pub async fn save_snapshot(&self, request: SaveRequest) -> Result<SaveReceipt> {
        let title = request.payload.title.clone();

        let (stored, action) = match &request.remote_id {
            None => {
                let stored = self
                    .bounded(
                        "create_document",
                        self.documents.create_document(request.payload),
                    )
                    .await?;
                (stored, ActivityAction::Creation)
            }
            Some(id) => {
                let stored = self
                    .bounded(
                        "update_document",
                        self.documents.update_document(id, request.payload),
                    )
                    .await?;
                (stored, ActivityAction::Modification)
            }
        };

        tracing::info!(id = %stored.id, ?action, "Saved document");

        let activity = Activity {
            action,
            document_id: stored.id.clone(),
            document_title: title,
            user: self.user.clone(),
        };
        if let Err(e) = self
            .bounded("create_activity", self.activity.create_activity(activity))
            .await
        {
            tracing::warn!(id = %stored.id, "Failed to record activity: {}", e);
        }

        Ok(SaveReceipt {
            created: action == ActivityAction::Creation,
            document_id: stored.id,
            saved_at: Utc::now(),
            version: request.version,
            generation: request.generation,
        })
    }

    /// Replace `doc` with the stored document `id`
    pub async fn load(&self, doc: &mut EditorDocument, id: &str) -> Result<()> {
        doc.clear_error();

        match self
            .bounded("get_document_by_id", self.documents.get_document_by_id(id))
            .await
        {
            Ok(stored) => {
                tracing::info!(id, blocks = stored.blocks.len(), "Loaded document");
                doc.replace_with(stored);
                Ok(())
            }
            Err(e) => {
                tracing::error!(id, "Failed to load document: {}", e);
                doc.record_error(&e);
                Err(e)
            }
        }
    }

    /// Fresh unsaved document seeded from template `template_id`
    pub async fn new_from_template(&self, template_id: &str) -> Result<EditorDocument> {
        let Some(templates) = &self.templates else {
            return Err(crate::service::ServiceError::template_not_found(template_id).into());
        };

        let template = self
            .bounded("get_template_by_id", templates.get_template_by_id(template_id))
            .await?;

        tracing::info!(template = template_id, "Created document from template");
        Ok(EditorDocument::from_template(&template))
    }
}
