//! External collaborators consumed by the editor core.
//!
//! The editor never talks to a database directly. Saving, loading, activity
//! logging and template lookup go through these traits so that the HTTP
//! client, the in-memory stand-in ([`crate::memory`]) and test doubles are
//! interchangeable.

use crate::block::Block;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body sent on create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub title: String,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub preview: String,
}

/// Document as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub preview: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Creation,
    Modification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub action: ActivityAction,
    pub document_id: String,
    pub document_title: String,
    pub user: String,
}

/// Named starting block sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub blocks: Vec<Block>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    pub fn document_not_found(id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            kind: "Document",
            id: id.into(),
        }
    }

    pub fn template_not_found(id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            kind: "Template",
            id: id.into(),
        }
    }
}

/// Remote document CRUD
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create_document(&self, payload: DocumentPayload)
        -> Result<StoredDocument, ServiceError>;

    async fn update_document(
        &self,
        id: &str,
        payload: DocumentPayload,
    ) -> Result<StoredDocument, ServiceError>;

    async fn get_document_by_id(&self, id: &str) -> Result<StoredDocument, ServiceError>;
}

/// Dashboard activity feed
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn create_activity(&self, activity: Activity) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait TemplateProvider: Send + Sync {
    async fn get_template_by_id(&self, id: &str) -> Result<Template, ServiceError>;

    async fn list_templates(&self) -> Result<Vec<Template>, ServiceError>;
}
