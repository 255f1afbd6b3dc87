//! # Autosave
//!
//! Background task that saves the shared document on a fixed interval.
//!
//! ```text
//!            enable                  timer fires
//!   Idle ───────────▶ Scheduled ─────────────────▶ (dirty?) ──no──▶ Scheduled
//!    ▲                    ▲                           │yes
//!    │ disable            │ reschedule                ▼
//!    └────────────────────┴──────────────────────── Saving
//! ```
//!
//! The document lock is held only to snapshot and to record the result, never
//! across the remote call. Edits made while a save is in flight keep the
//! document dirty (see [`EditorDocument::complete_save`]) and are picked up by
//! the next cycle.
//!
//! Failures are reported on the event channel; the loop keeps running.

use crate::config::{EditorConfig, MIN_AUTOSAVE_INTERVAL};
use crate::document::EditorDocument;
use crate::errors::{EditorError, Result};
use crate::persistence::PersistenceBridge;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Scheduled,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing changed since the last save
    Clean,
    SaveInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    Saved { document_id: String, created: bool },
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for AutosaveOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            interval: config.autosave_interval(),
            enabled: config.autosave_enabled,
        }
    }
}

enum Command {
    SaveNow(oneshot::Sender<AutosaveEvent>),
    SetEnabled(bool),
    Shutdown,
}

/// Handle to a running autosave task. Dropping it stops the task.
pub struct Autosave {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<AutosaveState>,
    task: JoinHandle<()>,
}

impl Autosave {
    pub fn spawn(
        doc: Arc<Mutex<EditorDocument>>,
        bridge: Arc<PersistenceBridge>,
        options: AutosaveOptions,
    ) -> (Self, mpsc::UnboundedReceiver<AutosaveEvent>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(AutosaveState::Idle);

        let worker = Worker {
            doc,
            bridge,
            interval: options.interval.max(MIN_AUTOSAVE_INTERVAL),
            events,
            state: state_tx,
        };
        let task = tokio::spawn(worker.run(command_rx, options.enabled));

        (
            Self {
                commands,
                state,
                task,
            },
            event_rx,
        )
    }

    /// Cancel the pending timer and save immediately, even if the document is clean
    pub async fn save_now(&self) -> Result<AutosaveEvent> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::SaveNow(reply))
            .map_err(|_| EditorError::AutosaveStopped)?;
        response.await.map_err(|_| EditorError::AutosaveStopped)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.commands
            .send(Command::SetEnabled(enabled))
            .map_err(|_| EditorError::AutosaveStopped)
    }

    pub fn state(&self) -> AutosaveState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveState> {
        self.state.clone()
    }

    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::error!("Autosave task panicked: {}", e);
        }
    }
}

struct Worker {
    doc: Arc<Mutex<EditorDocument>>,
    bridge: Arc<PersistenceBridge>,
    interval: Duration,
    events: mpsc::UnboundedSender<AutosaveEvent>,
    state: watch::Sender<AutosaveState>,
}

impl Worker {
    fn schedule(&self, enabled: bool) -> Option<Instant> {
        if enabled {
            self.state.send_replace(AutosaveState::Scheduled);
            Some(Instant::now() + self.interval)
        } else {
            self.state.send_replace(AutosaveState::Idle);
            None
        }
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>, mut enabled: bool) {
        let mut deadline = self.schedule(enabled);
        tracing::debug!(interval = ?self.interval, enabled, "Autosave started");

        loop {
            let timer = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = timer => {
                    let event = self.cycle(false).await;
                    deadline = self.schedule(enabled);
                    let _ = self.events.send(event);
                }
                command = commands.recv() => match command {
                    Some(Command::SaveNow(reply)) => {
                        let event = self.cycle(true).await;
                        deadline = self.schedule(enabled);
                        let _ = self.events.send(event.clone());
                        let _ = reply.send(event);
                    }
                    Some(Command::SetEnabled(value)) => {
                        enabled = value;
                        deadline = self.schedule(enabled);
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        self.state.send_replace(AutosaveState::Idle);
        tracing::debug!("Autosave stopped");
    }

    /// One save attempt. `force` saves a clean document too.
    async fn cycle(&self, force: bool) -> AutosaveEvent {
        let request = {
            let mut doc = self.doc.lock().await;
            if !force && !doc.is_dirty() {
                return AutosaveEvent::Skipped(SkipReason::Clean);
            }
            match doc.begin_save() {
                Some(request) => request,
                None => return AutosaveEvent::Skipped(SkipReason::SaveInFlight),
            }
        };

        let generation = request.generation;
        self.state.send_replace(AutosaveState::Saving);
        let result = self.bridge.save_snapshot(request).await;

        let mut doc = self.doc.lock().await;
        match result {
            Ok(receipt) => {
                doc.complete_save(&receipt);
                AutosaveEvent::Saved {
                    document_id: receipt.document_id,
                    created: receipt.created,
                }
            }
            Err(e) => {
                tracing::warn!("Autosave failed: {}", e);
                doc.fail_save(generation, &e);
                AutosaveEvent::Failed(e.to_string())
            }
        }
    }
}
