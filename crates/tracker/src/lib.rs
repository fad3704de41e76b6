//! Implementation status tracking for authored game-design content.
//!
//! Persists an immutable snapshot of an entity's authorable content when it
//! is flagged implemented, and compares live content against that snapshot
//! to produce a field-level drift report. Works uniformly across characters,
//! items, dialogs, quests, and the four marker kinds nested inside maps.

pub mod model;
pub mod status;

pub use model::{
    Character, Dialog, DialogNode, EntityKind, FieldKind, FlexField, Identified, Item,
    ItemMarker, Map, MapChangeMarker, MarkerKind, NpcMarker, Quest, QuestMarker,
};
pub use status::{
    format_compare_result, format_differences, resolve_marker, ChangeKind,
    CharacterStore, CompareResult, EntityStore, FieldDifference, FormattedCompareResponse,
    FormattedDifference, ImplementationTracker, JsonStore, MarkerRef, MemoryStore,
    Notifier, NotifyError, RecordingNotifier, SnapshotCompare, SnapshotStore, StoreError,
    TimelineEvent, TrackError, TracingNotifier, TrackerStores,
};
