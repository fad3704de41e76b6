use serde::Serialize;
use thiserror::Error;

use crate::model::{EntityKind, MarkerKind};

use super::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// One field-level discrepancy between live content and its snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDifference {
    pub field: String,
    pub kind: ChangeKind,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldDifference {
    pub(crate) fn added(field: String, new_value: String) -> Self {
        Self {
            field,
            kind: ChangeKind::Added,
            old_value: None,
            new_value: Some(new_value),
        }
    }

    pub(crate) fn removed(field: String, old_value: String) -> Self {
        Self {
            field,
            kind: ChangeKind::Removed,
            old_value: Some(old_value),
            new_value: None,
        }
    }

    pub(crate) fn changed(field: String, old_value: String, new_value: String) -> Self {
        Self {
            field,
            kind: ChangeKind::Changed,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }
}

/// Outcome of comparing live content against its most recent snapshot.
///
/// `snapshot_exists == false` means the entity was never flagged implemented;
/// an empty difference list with `snapshot_exists == true` means nothing
/// drifted since the last flag. Callers must not conflate the two.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    pub snapshot_exists: bool,
    pub differences: Vec<FieldDifference>,
}

impl CompareResult {
    pub(crate) fn no_snapshot() -> Self {
        Self {
            snapshot_exists: false,
            differences: Vec::new(),
        }
    }

    pub(crate) fn with_differences(differences: Vec<FieldDifference>) -> Self {
        Self {
            snapshot_exists: true,
            differences,
        }
    }
}

/// Display form of a difference. Same change semantics as the raw form, with
/// the field path replaced by a human label and absent values rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedDifference {
    pub label: String,
    pub kind: ChangeKind,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("{kind} '{id}' was not found")]
    EntityNotFound { kind: EntityKind, id: String },
    #[error("map '{id}' was not found")]
    MapNotFound { id: String },
    #[error("map '{map_id}' has no {kind} marker with id '{marker_id}'")]
    MarkerNotFound {
        map_id: String,
        marker_id: String,
        kind: MarkerKind,
    },
    #[error("store operation failed while {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl TrackError {
    pub(crate) fn store(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { action, source }
    }
}
