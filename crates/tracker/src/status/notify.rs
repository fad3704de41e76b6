use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::model::MarkerKind;

/// A completed implementation event, delivered to the audit timeline after
/// the flag operation has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    ImplementedCharacter {
        id: String,
        name: String,
    },
    ImplementedItem {
        id: String,
        name: String,
    },
    ImplementedDialog {
        related_character_id: String,
        related_character_name: String,
    },
    ImplementedQuest {
        id: String,
        name: String,
    },
    ImplementedMarker {
        map_id: String,
        marker_id: String,
        kind: MarkerKind,
        map_name: String,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("timeline delivery failed: {message}")]
    Delivery { message: String },
}

/// Timeline sink. Delivery is best-effort from the engine's perspective; a
/// failure never rolls back a completed flag operation.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &TimelineEvent) -> Result<(), NotifyError>;
}

// Lets a shared recorder double as the tracker's notifier in tests.
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, event: &TimelineEvent) -> Result<(), NotifyError> {
        (**self).notify(event)
    }
}

/// Notifier that emits one structured log line per event.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &TimelineEvent) -> Result<(), NotifyError> {
        match event {
            TimelineEvent::ImplementedCharacter { id, name } => {
                info!(id = %id, name = %name, "timeline_implemented_character");
            }
            TimelineEvent::ImplementedItem { id, name } => {
                info!(id = %id, name = %name, "timeline_implemented_item");
            }
            TimelineEvent::ImplementedDialog {
                related_character_id,
                related_character_name,
            } => {
                info!(
                    related_character_id = %related_character_id,
                    related_character_name = %related_character_name,
                    "timeline_implemented_dialog"
                );
            }
            TimelineEvent::ImplementedQuest { id, name } => {
                info!(id = %id, name = %name, "timeline_implemented_quest");
            }
            TimelineEvent::ImplementedMarker {
                map_id,
                marker_id,
                kind,
                map_name,
            } => {
                info!(
                    map_id = %map_id,
                    marker_id = %marker_id,
                    marker_kind = %kind,
                    map_name = %map_name,
                    "timeline_implemented_marker"
                );
            }
        }
        Ok(())
    }
}

/// Notifier that records events in memory, for tests and embedders that
/// deliver asynchronously.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<TimelineEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TimelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &TimelineEvent) -> Result<(), NotifyError> {
        let mut events = self.events.lock().map_err(|_| NotifyError::Delivery {
            message: "event log poisoned".to_string(),
        })?;
        events.push(event.clone());
        Ok(())
    }
}
