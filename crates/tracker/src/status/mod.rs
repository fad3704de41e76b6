mod compare;
mod diff;
mod format;
mod json_store;
mod markers;
mod notify;
mod service;
mod store;
mod types;

pub use compare::SnapshotCompare;
pub use format::{format_compare_result, format_differences, FormattedCompareResponse};
pub use json_store::JsonStore;
pub use markers::{resolve_marker, MarkerRef};
pub use notify::{Notifier, NotifyError, RecordingNotifier, TimelineEvent, TracingNotifier};
pub use service::{ImplementationTracker, TrackerStores};
pub use store::{CharacterStore, EntityStore, MemoryStore, SnapshotStore, StoreError};
pub use types::{
    ChangeKind, CompareResult, FieldDifference, FormattedDifference, TrackError,
};
