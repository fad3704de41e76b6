use tracing::{info, warn};

use crate::model::{
    Character, Dialog, EntityKind, Item, ItemMarker, Map, MapChangeMarker, MarkerKind,
    NpcMarker, Quest, QuestMarker,
};

use super::compare::{compare_against_snapshot, SnapshotCompare};
use super::markers::{flag_marker, resolve_marker, FlaggedMarker, MarkerRef};
use super::notify::{Notifier, TimelineEvent};
use super::store::{CharacterStore, EntityStore, SnapshotStore};
use super::types::{CompareResult, TrackError};

/// The full set of repositories the tracker operates over: one live store
/// per entity kind, one snapshot store per entity kind and per marker kind.
/// Snapshot stores are never shared across kinds.
pub struct TrackerStores {
    pub characters: Box<dyn CharacterStore>,
    pub character_snapshots: Box<dyn SnapshotStore<Character>>,
    pub items: Box<dyn EntityStore<Item>>,
    pub item_snapshots: Box<dyn SnapshotStore<Item>>,
    pub dialogs: Box<dyn EntityStore<Dialog>>,
    pub dialog_snapshots: Box<dyn SnapshotStore<Dialog>>,
    pub quests: Box<dyn EntityStore<Quest>>,
    pub quest_snapshots: Box<dyn SnapshotStore<Quest>>,
    pub maps: Box<dyn EntityStore<Map>>,
    pub npc_marker_snapshots: Box<dyn SnapshotStore<NpcMarker>>,
    pub item_marker_snapshots: Box<dyn SnapshotStore<ItemMarker>>,
    pub map_change_marker_snapshots: Box<dyn SnapshotStore<MapChangeMarker>>,
    pub quest_marker_snapshots: Box<dyn SnapshotStore<QuestMarker>>,
}

/// Snapshot-compare engine entry point.
///
/// Compare operations are pure reads. Flag operations write the snapshot
/// first and only then persist the entity; a snapshot failure aborts the
/// flag with the stored entity untouched. Notification is best-effort and
/// happens after both writes.
pub struct ImplementationTracker {
    stores: TrackerStores,
    notifier: Box<dyn Notifier>,
}

impl ImplementationTracker {
    pub fn new(stores: TrackerStores, notifier: Box<dyn Notifier>) -> Self {
        Self { stores, notifier }
    }

    pub fn compare(&self, kind: EntityKind, id: &str) -> Result<CompareResult, TrackError> {
        match kind {
            EntityKind::Character => compare_entity(
                kind,
                id,
                self.stores.characters.as_ref(),
                self.stores.character_snapshots.as_ref(),
            ),
            EntityKind::Item => compare_entity(
                kind,
                id,
                self.stores.items.as_ref(),
                self.stores.item_snapshots.as_ref(),
            ),
            EntityKind::Dialog => compare_entity(
                kind,
                id,
                self.stores.dialogs.as_ref(),
                self.stores.dialog_snapshots.as_ref(),
            ),
            EntityKind::Quest => compare_entity(
                kind,
                id,
                self.stores.quests.as_ref(),
                self.stores.quest_snapshots.as_ref(),
            ),
        }
    }

    pub fn flag_implemented(&self, kind: EntityKind, id: &str) -> Result<(), TrackError> {
        match kind {
            EntityKind::Character => {
                let mut character =
                    load_entity(self.stores.characters.as_ref(), kind, id)?;
                character.is_implemented = true;
                snapshot_then_update(
                    &character,
                    self.stores.character_snapshots.as_ref(),
                    self.stores.characters.as_ref(),
                )?;
                info!(kind = %kind, id = %id, "flagged_implemented");
                self.notify(TimelineEvent::ImplementedCharacter {
                    id: character.id,
                    name: character.name,
                });
            }
            EntityKind::Item => {
                let mut item = load_entity(self.stores.items.as_ref(), kind, id)?;
                item.is_implemented = true;
                snapshot_then_update(
                    &item,
                    self.stores.item_snapshots.as_ref(),
                    self.stores.items.as_ref(),
                )?;
                info!(kind = %kind, id = %id, "flagged_implemented");
                self.notify(TimelineEvent::ImplementedItem {
                    id: item.id,
                    name: item.name,
                });
            }
            EntityKind::Dialog => {
                let mut dialog = load_entity(self.stores.dialogs.as_ref(), kind, id)?;
                dialog.is_implemented = true;
                snapshot_then_update(
                    &dialog,
                    self.stores.dialog_snapshots.as_ref(),
                    self.stores.dialogs.as_ref(),
                )?;
                info!(kind = %kind, id = %id, "flagged_implemented");
                let related_character_name =
                    self.related_character_name(&dialog.related_character_id);
                self.notify(TimelineEvent::ImplementedDialog {
                    related_character_id: dialog.related_character_id,
                    related_character_name,
                });
            }
            EntityKind::Quest => {
                let mut quest = load_entity(self.stores.quests.as_ref(), kind, id)?;
                quest.is_implemented = true;
                snapshot_then_update(
                    &quest,
                    self.stores.quest_snapshots.as_ref(),
                    self.stores.quests.as_ref(),
                )?;
                info!(kind = %kind, id = %id, "flagged_implemented");
                self.notify(TimelineEvent::ImplementedQuest {
                    id: quest.id,
                    name: quest.name,
                });
            }
        }
        Ok(())
    }

    pub fn compare_marker(
        &self,
        map_id: &str,
        marker_id: &str,
        kind: MarkerKind,
    ) -> Result<CompareResult, TrackError> {
        let map = self.load_map(map_id)?;
        let marker = resolve_marker(&map, marker_id, kind).ok_or_else(|| {
            TrackError::MarkerNotFound {
                map_id: map_id.to_string(),
                marker_id: marker_id.to_string(),
                kind,
            }
        })?;

        match marker {
            MarkerRef::Npc(live) => {
                let snapshot = self
                    .stores
                    .npc_marker_snapshots
                    .get_by_id(marker_id)
                    .map_err(TrackError::store("loading marker snapshot"))?;
                Ok(compare_against_snapshot(live, snapshot.as_ref()))
            }
            MarkerRef::Item(live) => {
                let snapshot = self
                    .stores
                    .item_marker_snapshots
                    .get_by_id(marker_id)
                    .map_err(TrackError::store("loading marker snapshot"))?;
                Ok(compare_against_snapshot(live, snapshot.as_ref()))
            }
            MarkerRef::MapChange(live) => {
                let snapshot = self
                    .stores
                    .map_change_marker_snapshots
                    .get_by_id(marker_id)
                    .map_err(TrackError::store("loading marker snapshot"))?;
                Ok(compare_against_snapshot(live, snapshot.as_ref()))
            }
            MarkerRef::Quest(live) => {
                let snapshot = self
                    .stores
                    .quest_marker_snapshots
                    .get_by_id(marker_id)
                    .map_err(TrackError::store("loading marker snapshot"))?;
                Ok(compare_against_snapshot(live, snapshot.as_ref()))
            }
        }
    }

    pub fn flag_marker_implemented(
        &self,
        map_id: &str,
        marker_id: &str,
        kind: MarkerKind,
    ) -> Result<(), TrackError> {
        let mut map = self.load_map(map_id)?;
        let flagged = flag_marker(&mut map, marker_id, kind).ok_or_else(|| {
            TrackError::MarkerNotFound {
                map_id: map_id.to_string(),
                marker_id: marker_id.to_string(),
                kind,
            }
        })?;

        // Snapshot first; markers are persisted only through the parent map.
        match &flagged {
            FlaggedMarker::Npc(marker) => self
                .stores
                .npc_marker_snapshots
                .save(marker)
                .map_err(TrackError::store("saving marker snapshot"))?,
            FlaggedMarker::Item(marker) => self
                .stores
                .item_marker_snapshots
                .save(marker)
                .map_err(TrackError::store("saving marker snapshot"))?,
            FlaggedMarker::MapChange(marker) => self
                .stores
                .map_change_marker_snapshots
                .save(marker)
                .map_err(TrackError::store("saving marker snapshot"))?,
            FlaggedMarker::Quest(marker) => self
                .stores
                .quest_marker_snapshots
                .save(marker)
                .map_err(TrackError::store("saving marker snapshot"))?,
        }
        self.stores
            .maps
            .update(&map)
            .map_err(TrackError::store("updating map"))?;

        info!(
            map_id = %map_id,
            marker_id = %marker_id,
            marker_kind = %kind,
            "marker_flagged_implemented"
        );
        self.notify(TimelineEvent::ImplementedMarker {
            map_id: map_id.to_string(),
            marker_id: marker_id.to_string(),
            kind,
            map_name: map.name,
        });
        Ok(())
    }

    fn load_map(&self, map_id: &str) -> Result<Map, TrackError> {
        self.stores
            .maps
            .get_by_id(map_id)
            .map_err(TrackError::store("loading map"))?
            .ok_or_else(|| TrackError::MapNotFound {
                id: map_id.to_string(),
            })
    }

    fn related_character_name(&self, related_character_id: &str) -> String {
        let ids = [related_character_id.to_string()];
        match self.stores.characters.resolve_display_names(&ids) {
            Ok(names) => names.into_iter().next().unwrap_or_default(),
            Err(error) => {
                warn!(
                    related_character_id = %related_character_id,
                    error = %error,
                    "related_character_lookup_failed"
                );
                String::new()
            }
        }
    }

    fn notify(&self, event: TimelineEvent) {
        if let Err(error) = self.notifier.notify(&event) {
            warn!(error = %error, "timeline_notify_failed");
        }
    }
}

fn load_entity<T, S>(store: &S, kind: EntityKind, id: &str) -> Result<T, TrackError>
where
    S: EntityStore<T> + ?Sized,
{
    store
        .get_by_id(id)
        .map_err(TrackError::store("loading entity"))?
        .ok_or_else(|| TrackError::EntityNotFound {
            kind,
            id: id.to_string(),
        })
}

fn compare_entity<T, S>(
    kind: EntityKind,
    id: &str,
    store: &S,
    snapshots: &dyn SnapshotStore<T>,
) -> Result<CompareResult, TrackError>
where
    T: SnapshotCompare,
    S: EntityStore<T> + ?Sized,
{
    let live = load_entity(store, kind, id)?;
    let snapshot = snapshots
        .get_by_id(id)
        .map_err(TrackError::store("loading snapshot"))?;
    Ok(compare_against_snapshot(&live, snapshot.as_ref()))
}

fn snapshot_then_update<T, S>(
    entity: &T,
    snapshots: &dyn SnapshotStore<T>,
    store: &S,
) -> Result<(), TrackError>
where
    S: EntityStore<T> + ?Sized,
{
    snapshots
        .save(entity)
        .map_err(TrackError::store("saving snapshot"))?;
    store
        .update(entity)
        .map_err(TrackError::store("updating entity"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::FlexField;
    use crate::status::notify::{NotifyError, RecordingNotifier};
    use crate::status::store::{MemoryStore, StoreError};
    use crate::status::types::ChangeKind;

    struct Fixture {
        tracker: ImplementationTracker,
        characters: Arc<MemoryStore<Character>>,
        items: Arc<MemoryStore<Item>>,
        dialogs: Arc<MemoryStore<Dialog>>,
        quests: Arc<MemoryStore<Quest>>,
        maps: Arc<MemoryStore<Map>>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        fixture_with_snapshots(Box::new(MemoryStore::<Character>::new()))
    }

    fn fixture_with_snapshots(
        character_snapshots: Box<dyn SnapshotStore<Character>>,
    ) -> Fixture {
        let characters = Arc::new(MemoryStore::<Character>::new());
        let items = Arc::new(MemoryStore::<Item>::new());
        let dialogs = Arc::new(MemoryStore::<Dialog>::new());
        let quests = Arc::new(MemoryStore::<Quest>::new());
        let maps = Arc::new(MemoryStore::<Map>::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let stores = TrackerStores {
            characters: Box::new(Arc::clone(&characters)),
            character_snapshots,
            items: Box::new(Arc::clone(&items)),
            item_snapshots: Box::new(MemoryStore::<Item>::new()),
            dialogs: Box::new(Arc::clone(&dialogs)),
            dialog_snapshots: Box::new(MemoryStore::<Dialog>::new()),
            quests: Box::new(Arc::clone(&quests)),
            quest_snapshots: Box::new(MemoryStore::<Quest>::new()),
            maps: Box::new(Arc::clone(&maps)),
            npc_marker_snapshots: Box::new(MemoryStore::<NpcMarker>::new()),
            item_marker_snapshots: Box::new(MemoryStore::<ItemMarker>::new()),
            map_change_marker_snapshots: Box::new(MemoryStore::<MapChangeMarker>::new()),
            quest_marker_snapshots: Box::new(MemoryStore::<QuestMarker>::new()),
        };
        let tracker =
            ImplementationTracker::new(stores, Box::new(Arc::clone(&notifier)));

        Fixture {
            tracker,
            characters,
            items,
            dialogs,
            quests,
            maps,
            notifier,
        }
    }

    fn character(id: &str, name: &str, hp: &str) -> Character {
        Character {
            id: id.to_string(),
            name: name.to_string(),
            fields: vec![FlexField::number("hp", hp)],
            is_implemented: false,
        }
    }

    fn harbor_map() -> Map {
        Map {
            id: "map-1".to_string(),
            name: "Harbor".to_string(),
            npc_markers: Vec::new(),
            item_markers: vec![ItemMarker {
                id: "m1".to_string(),
                item_id: "item-7".to_string(),
                x: 1.0,
                y: 2.0,
                is_implemented: false,
            }],
            map_change_markers: Vec::new(),
            quest_markers: vec![QuestMarker {
                id: "m1".to_string(),
                quest_id: "q1".to_string(),
                name: "Start".to_string(),
                x: 3.0,
                y: 4.0,
                is_implemented: false,
            }],
        }
    }

    #[test]
    fn compare_without_snapshot_reports_no_snapshot() {
        let fx = fixture();
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");

        let result = fx
            .tracker
            .compare(EntityKind::Character, "npc-42")
            .expect("compare");
        assert!(!result.snapshot_exists);
        assert!(result.differences.is_empty());
    }

    #[test]
    fn compare_missing_entity_is_not_found() {
        let fx = fixture();
        let error = fx
            .tracker
            .compare(EntityKind::Character, "ghost")
            .expect_err("not found");
        assert!(matches!(error, TrackError::EntityNotFound { .. }));
    }

    #[test]
    fn flag_then_compare_round_trip_is_clean() {
        let fx = fixture();
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");

        fx.tracker
            .flag_implemented(EntityKind::Character, "npc-42")
            .expect("flag");
        let result = fx
            .tracker
            .compare(EntityKind::Character, "npc-42")
            .expect("compare");
        assert!(result.snapshot_exists);
        assert!(result.differences.is_empty());

        let stored = EntityStore::get_by_id(fx.characters.as_ref(), "npc-42")
            .expect("get")
            .expect("present");
        assert!(stored.is_implemented);
    }

    #[test]
    fn drift_after_flag_is_reported() {
        let fx = fixture();
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");
        fx.tracker
            .flag_implemented(EntityKind::Character, "npc-42")
            .expect("flag");

        let mut edited = character("npc-42", "Guard", "15");
        edited.is_implemented = true;
        fx.characters.insert(edited).expect("edit");

        let result = fx
            .tracker
            .compare(EntityKind::Character, "npc-42")
            .expect("compare");
        assert!(result.snapshot_exists);
        assert_eq!(result.differences.len(), 1);
        assert_eq!(result.differences[0].field, "hp");
        assert_eq!(result.differences[0].kind, ChangeKind::Changed);
        assert_eq!(result.differences[0].old_value.as_deref(), Some("10"));
        assert_eq!(result.differences[0].new_value.as_deref(), Some("15"));
    }

    #[test]
    fn flag_emits_timeline_event() {
        let fx = fixture();
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");
        fx.tracker
            .flag_implemented(EntityKind::Character, "npc-42")
            .expect("flag");

        assert_eq!(
            fx.notifier.events(),
            vec![TimelineEvent::ImplementedCharacter {
                id: "npc-42".to_string(),
                name: "Guard".to_string(),
            }]
        );
    }

    #[test]
    fn dialog_flag_resolves_related_character_name() {
        let fx = fixture();
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");
        fx.dialogs
            .insert(Dialog {
                id: "d1".to_string(),
                related_character_id: "npc-42".to_string(),
                nodes: Vec::new(),
                is_implemented: false,
            })
            .expect("insert");

        fx.tracker
            .flag_implemented(EntityKind::Dialog, "d1")
            .expect("flag");
        assert_eq!(
            fx.notifier.events(),
            vec![TimelineEvent::ImplementedDialog {
                related_character_id: "npc-42".to_string(),
                related_character_name: "Guard".to_string(),
            }]
        );
    }

    struct FailingSnapshotStore;

    impl SnapshotStore<Character> for FailingSnapshotStore {
        fn save(&self, _value: &Character) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn get_by_id(&self, _id: &str) -> Result<Option<Character>, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn snapshot_write_failure_leaves_entity_unflagged() {
        let fx = fixture_with_snapshots(Box::new(FailingSnapshotStore));
        fx.characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");

        let error = fx
            .tracker
            .flag_implemented(EntityKind::Character, "npc-42")
            .expect_err("snapshot failure");
        assert!(matches!(error, TrackError::Store { .. }));

        let stored = EntityStore::get_by_id(fx.characters.as_ref(), "npc-42")
            .expect("get")
            .expect("present");
        assert!(!stored.is_implemented);
        assert!(fx.notifier.events().is_empty());
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _event: &TimelineEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery {
                message: "timeline offline".to_string(),
            })
        }
    }

    #[test]
    fn notifier_failure_does_not_undo_the_flag() {
        let characters = Arc::new(MemoryStore::<Character>::new());
        characters
            .insert(character("npc-42", "Guard", "10"))
            .expect("insert");
        let stores = TrackerStores {
            characters: Box::new(Arc::clone(&characters)),
            character_snapshots: Box::new(MemoryStore::<Character>::new()),
            items: Box::new(MemoryStore::<Item>::new()),
            item_snapshots: Box::new(MemoryStore::<Item>::new()),
            dialogs: Box::new(MemoryStore::<Dialog>::new()),
            dialog_snapshots: Box::new(MemoryStore::<Dialog>::new()),
            quests: Box::new(MemoryStore::<Quest>::new()),
            quest_snapshots: Box::new(MemoryStore::<Quest>::new()),
            maps: Box::new(MemoryStore::<Map>::new()),
            npc_marker_snapshots: Box::new(MemoryStore::<NpcMarker>::new()),
            item_marker_snapshots: Box::new(MemoryStore::<ItemMarker>::new()),
            map_change_marker_snapshots: Box::new(MemoryStore::<MapChangeMarker>::new()),
            quest_marker_snapshots: Box::new(MemoryStore::<QuestMarker>::new()),
        };
        let tracker = ImplementationTracker::new(stores, Box::new(FailingNotifier));

        tracker
            .flag_implemented(EntityKind::Character, "npc-42")
            .expect("flag succeeds despite notifier");
        let stored = EntityStore::get_by_id(characters.as_ref(), "npc-42")
            .expect("get")
            .expect("present");
        assert!(stored.is_implemented);
    }

    #[test]
    fn marker_flag_persists_parent_map_and_round_trips() {
        let fx = fixture();
        fx.maps.insert(harbor_map()).expect("insert");

        fx.tracker
            .flag_marker_implemented("map-1", "m1", MarkerKind::Quest)
            .expect("flag");

        let stored = EntityStore::get_by_id(fx.maps.as_ref(), "map-1")
            .expect("get")
            .expect("present");
        assert!(stored.quest_markers[0].is_implemented);
        assert!(!stored.item_markers[0].is_implemented);

        let result = fx
            .tracker
            .compare_marker("map-1", "m1", MarkerKind::Quest)
            .expect("compare");
        assert!(result.snapshot_exists);
        assert!(result.differences.is_empty());
    }

    #[test]
    fn marker_snapshots_are_isolated_per_kind() {
        // Flagging the quest marker "m1" must not satisfy a compare for the
        // item marker with the same id.
        let fx = fixture();
        fx.maps.insert(harbor_map()).expect("insert");

        fx.tracker
            .flag_marker_implemented("map-1", "m1", MarkerKind::Quest)
            .expect("flag");

        let item_result = fx
            .tracker
            .compare_marker("map-1", "m1", MarkerKind::Item)
            .expect("compare");
        assert!(!item_result.snapshot_exists);
    }

    #[test]
    fn marker_drift_after_flag_is_reported() {
        let fx = fixture();
        fx.maps.insert(harbor_map()).expect("insert");
        fx.tracker
            .flag_marker_implemented("map-1", "m1", MarkerKind::Quest)
            .expect("flag");

        let mut edited = EntityStore::get_by_id(fx.maps.as_ref(), "map-1")
            .expect("get")
            .expect("present");
        edited.quest_markers[0].x = 9.0;
        fx.maps.insert(edited).expect("edit");

        let result = fx
            .tracker
            .compare_marker("map-1", "m1", MarkerKind::Quest)
            .expect("compare");
        assert_eq!(result.differences.len(), 1);
        assert_eq!(result.differences[0].field, "x");
        assert_eq!(result.differences[0].old_value.as_deref(), Some("3"));
        assert_eq!(result.differences[0].new_value.as_deref(), Some("9"));
    }

    #[test]
    fn missing_map_and_missing_marker_are_distinct_errors() {
        let fx = fixture();
        let error = fx
            .tracker
            .compare_marker("nope", "m1", MarkerKind::Quest)
            .expect_err("no map");
        assert!(matches!(error, TrackError::MapNotFound { .. }));

        fx.maps.insert(harbor_map()).expect("insert");
        let error = fx
            .tracker
            .compare_marker("map-1", "m1", MarkerKind::Npc)
            .expect_err("no npc marker");
        assert!(matches!(error, TrackError::MarkerNotFound { .. }));
    }

    #[test]
    fn marker_flag_emits_timeline_event_with_map_name() {
        let fx = fixture();
        fx.maps.insert(harbor_map()).expect("insert");
        fx.tracker
            .flag_marker_implemented("map-1", "m1", MarkerKind::Item)
            .expect("flag");

        assert_eq!(
            fx.notifier.events(),
            vec![TimelineEvent::ImplementedMarker {
                map_id: "map-1".to_string(),
                marker_id: "m1".to_string(),
                kind: MarkerKind::Item,
                map_name: "Harbor".to_string(),
            }]
        );
    }

    #[test]
    fn quest_and_item_entities_flag_and_compare() {
        let fx = fixture();
        fx.items
            .insert(Item {
                id: "item-7".to_string(),
                name: "Lantern".to_string(),
                fields: Vec::new(),
                is_implemented: false,
            })
            .expect("insert");
        fx.quests
            .insert(Quest {
                id: "q1".to_string(),
                name: "Rescue".to_string(),
                description: "Save the miller".to_string(),
                is_main_quest: false,
                fields: Vec::new(),
                is_implemented: false,
            })
            .expect("insert");

        fx.tracker
            .flag_implemented(EntityKind::Item, "item-7")
            .expect("flag item");
        fx.tracker
            .flag_implemented(EntityKind::Quest, "q1")
            .expect("flag quest");

        assert!(fx
            .tracker
            .compare(EntityKind::Item, "item-7")
            .expect("compare")
            .snapshot_exists);
        assert!(fx
            .tracker
            .compare(EntityKind::Quest, "q1")
            .expect("compare")
            .snapshot_exists);
    }
}
