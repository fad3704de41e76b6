use std::io::Write;
use std::path::Path;

use tracker::{
    format_compare_result, Character, CompareResult, Dialog, EntityKind,
    ImplementationTracker, Item, ItemMarker, JsonStore, Map, MapChangeMarker, MarkerKind,
    NpcMarker, Quest, QuestMarker, TracingNotifier, TrackerStores,
};

pub const DATA_DIR_ENV_VAR: &str = "TRACKER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Compare {
        kind: EntityKind,
        id: String,
    },
    Flag {
        kind: EntityKind,
        id: String,
    },
    CompareMarker {
        map_id: String,
        marker_id: String,
        kind: MarkerKind,
    },
    FlagMarker {
        map_id: String,
        marker_id: String,
        kind: MarkerKind,
    },
}

/// Wires a tracker over JSON-file stores rooted at `data_dir`. Every entity
/// kind and marker kind gets its own collection directory so snapshot
/// isolation holds on disk as well.
pub fn build_tracker(data_dir: &Path) -> ImplementationTracker {
    let stores = TrackerStores {
        characters: Box::new(JsonStore::<Character>::new(data_dir, "characters")),
        character_snapshots: Box::new(JsonStore::<Character>::new(
            data_dir,
            "snapshots/characters",
        )),
        items: Box::new(JsonStore::<Item>::new(data_dir, "items")),
        item_snapshots: Box::new(JsonStore::<Item>::new(data_dir, "snapshots/items")),
        dialogs: Box::new(JsonStore::<Dialog>::new(data_dir, "dialogs")),
        dialog_snapshots: Box::new(JsonStore::<Dialog>::new(data_dir, "snapshots/dialogs")),
        quests: Box::new(JsonStore::<Quest>::new(data_dir, "quests")),
        quest_snapshots: Box::new(JsonStore::<Quest>::new(data_dir, "snapshots/quests")),
        maps: Box::new(JsonStore::<Map>::new(data_dir, "maps")),
        npc_marker_snapshots: Box::new(JsonStore::<NpcMarker>::new(
            data_dir,
            "snapshots/markers/npc",
        )),
        item_marker_snapshots: Box::new(JsonStore::<ItemMarker>::new(
            data_dir,
            "snapshots/markers/item",
        )),
        map_change_marker_snapshots: Box::new(JsonStore::<MapChangeMarker>::new(
            data_dir,
            "snapshots/markers/map_change",
        )),
        quest_marker_snapshots: Box::new(JsonStore::<QuestMarker>::new(
            data_dir,
            "snapshots/markers/quest",
        )),
    };
    ImplementationTracker::new(stores, Box::new(TracingNotifier))
}

pub fn run<W: Write>(
    kind: CommandKind,
    data_dir: &Path,
    stdout: &mut W,
) -> Result<(), String> {
    let tracker = build_tracker(data_dir);
    match kind {
        CommandKind::Compare { kind, id } => {
            let result = tracker
                .compare(kind, &id)
                .map_err(|error| error.to_string())?;
            print_compare(stdout, &result)
        }
        CommandKind::Flag { kind, id } => {
            tracker
                .flag_implemented(kind, &id)
                .map_err(|error| error.to_string())?;
            writeln!(stdout, "flagged {kind} '{id}' as implemented")
                .map_err(|error| format!("failed to write output: {error}"))
        }
        CommandKind::CompareMarker {
            map_id,
            marker_id,
            kind,
        } => {
            let result = tracker
                .compare_marker(&map_id, &marker_id, kind)
                .map_err(|error| error.to_string())?;
            print_compare(stdout, &result)
        }
        CommandKind::FlagMarker {
            map_id,
            marker_id,
            kind,
        } => {
            tracker
                .flag_marker_implemented(&map_id, &marker_id, kind)
                .map_err(|error| error.to_string())?;
            writeln!(
                stdout,
                "flagged {kind} marker '{marker_id}' on map '{map_id}' as implemented"
            )
            .map_err(|error| format!("failed to write output: {error}"))
        }
    }
}

fn print_compare<W: Write>(stdout: &mut W, result: &CompareResult) -> Result<(), String> {
    let response = format_compare_result(result);
    let write = |stdout: &mut W, line: &str| {
        writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
    };

    if !response.snapshot_exists {
        return write(stdout, "no snapshot: never flagged as implemented");
    }
    if response.differences.is_empty() {
        return write(stdout, "unchanged since last implementation");
    }
    for row in &response.differences {
        write(
            stdout,
            &format!(
                "{:?} {} | was: {} | now: {}",
                row.kind, row.label, row.old_value, row.new_value
            ),
        )?;
    }
    Ok(())
}
