//! Error types for the editor

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Service error: {0}")]
    Service(#[from] crate::service::ServiceError),

    #[error("Invalid question: {0}")]
    Qcm(#[from] crate::qcm::QcmError),

    #[error("Import error: {0}")]
    Import(#[from] crate::import::ImportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("No block is selected")]
    NoSelection,

    #[error("Image URL is required")]
    MissingImageUrl,

    #[error("Autosave task has stopped")]
    AutosaveStopped,
}

pub type Result<T> = std::result::Result<T, EditorError>;
