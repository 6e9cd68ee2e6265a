// events.rs — Creation audit events and notification dispatch.
//
// Every stored goal produces a MetaCreated event. Sinks decide what to do
// with it; the always-on LogSink appends one JSON line per event so the
// audit trail can be tailed or shipped elsewhere.
//
// Dispatch happens after the goal is committed. A failing sink is logged
// and skipped; it never turns a successful creation into an error.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MetaError;
use crate::meta::Meta;

/// Events emitted by the goal service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MetaEvent {
    /// A goal was validated and stored.
    MetaCreated {
        event_id: Uuid,
        meta_id: i64,
        division: String,
        proceso: String,
        indicador: String,
        creado_por: String,
        timestamp: DateTime<Utc>,
    },
}

impl MetaEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            MetaEvent::MetaCreated { .. } => "meta_created",
        }
    }

    pub fn meta_created(meta: &Meta) -> Self {
        MetaEvent::MetaCreated {
            event_id: Uuid::new_v4(),
            meta_id: meta.id,
            division: meta.division.clone(),
            proceso: meta.proceso.clone(),
            indicador: meta.indicador.clone(),
            creado_por: meta.creado_por.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Receives goal events.
pub trait NotificationSink: Send + Sync {
    /// Handle an event. Errors are logged but don't stop the system.
    fn send(&self, event: &MetaEvent) -> Result<(), MetaError>;
}

/// Appends events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &MetaEvent) -> Result<(), MetaError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| MetaError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| MetaError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| MetaError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Dispatches events to multiple sinks.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch an event to all sinks.
    pub fn dispatch(&self, event: &MetaEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!(event = event.event_type(), "notification sink error: {}", e);
            }
        }
    }
}
