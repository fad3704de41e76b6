use crate::model::{
    Character, Dialog, FlexField, Item, ItemMarker, MapChangeMarker, NpcMarker, Quest,
    QuestMarker,
};

use super::diff::{
    compare_fixed_bool, compare_fixed_f32, compare_fixed_field, diff_flex_fields,
};
use super::types::{CompareResult, FieldDifference};

/// Field-level comparison against a snapshot of the same kind. Implementors
/// decide only which fixed fields participate; flexible-field and keyed
/// sequence comparison always goes through the shared diff algorithm. The
/// `is_implemented` flag is review metadata and never participates.
pub trait SnapshotCompare {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference>;
}

pub(crate) fn compare_against_snapshot<T: SnapshotCompare>(
    live: &T,
    snapshot: Option<&T>,
) -> CompareResult {
    match snapshot {
        None => CompareResult::no_snapshot(),
        Some(snapshot) => {
            CompareResult::with_differences(T::field_differences(live, snapshot))
        }
    }
}

impl SnapshotCompare for Character {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "name", &snapshot.name, &live.name);
        differences.extend(diff_flex_fields(&live.fields, &snapshot.fields));
        differences
    }
}

impl SnapshotCompare for Item {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "name", &snapshot.name, &live.name);
        differences.extend(diff_flex_fields(&live.fields, &snapshot.fields));
        differences
    }
}

impl SnapshotCompare for Quest {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "name", &snapshot.name, &live.name);
        compare_fixed_field(
            &mut differences,
            "description",
            &snapshot.description,
            &live.description,
        );
        compare_fixed_bool(
            &mut differences,
            "is_main_quest",
            snapshot.is_main_quest,
            live.is_main_quest,
        );
        differences.extend(diff_flex_fields(&live.fields, &snapshot.fields));
        differences
    }
}

impl SnapshotCompare for Dialog {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(
            &mut differences,
            "related_character_id",
            &snapshot.related_character_id,
            &live.related_character_id,
        );
        differences.extend(diff_flex_fields(
            &node_fields(live),
            &node_fields(snapshot),
        ));
        differences
    }
}

// Dialog nodes ride the shared keyed diff: one synthetic field per node,
// keyed by node id.
fn node_fields(dialog: &Dialog) -> Vec<FlexField> {
    dialog
        .nodes
        .iter()
        .map(|node| FlexField::text(&format!("node[{}]", node.id), &node.text))
        .collect()
}

impl SnapshotCompare for NpcMarker {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "npc_id", &snapshot.npc_id, &live.npc_id);
        compare_fixed_f32(&mut differences, "x", snapshot.x, live.x);
        compare_fixed_f32(&mut differences, "y", snapshot.y, live.y);
        differences
    }
}

impl SnapshotCompare for ItemMarker {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "item_id", &snapshot.item_id, &live.item_id);
        compare_fixed_f32(&mut differences, "x", snapshot.x, live.x);
        compare_fixed_f32(&mut differences, "y", snapshot.y, live.y);
        differences
    }
}

impl SnapshotCompare for MapChangeMarker {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(
            &mut differences,
            "target_map_id",
            &snapshot.target_map_id,
            &live.target_map_id,
        );
        compare_fixed_f32(&mut differences, "x", snapshot.x, live.x);
        compare_fixed_f32(&mut differences, "y", snapshot.y, live.y);
        differences
    }
}

impl SnapshotCompare for QuestMarker {
    fn field_differences(live: &Self, snapshot: &Self) -> Vec<FieldDifference> {
        let mut differences = Vec::new();
        compare_fixed_field(&mut differences, "quest_id", &snapshot.quest_id, &live.quest_id);
        compare_fixed_field(&mut differences, "name", &snapshot.name, &live.name);
        compare_fixed_f32(&mut differences, "x", snapshot.x, live.x);
        compare_fixed_f32(&mut differences, "y", snapshot.y, live.y);
        differences
    }
}
