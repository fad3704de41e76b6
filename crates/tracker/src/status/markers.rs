use crate::model::{
    ItemMarker, Map, MapChangeMarker, MarkerKind, NpcMarker, QuestMarker,
};

/// Borrowed view of one marker inside its parent map. The four marker kinds
/// share no common type; dispatch is an explicit match over the closed family.
#[derive(Debug)]
pub enum MarkerRef<'a> {
    Npc(&'a NpcMarker),
    Item(&'a ItemMarker),
    MapChange(&'a MapChangeMarker),
    Quest(&'a QuestMarker),
}

/// Owned copy of a marker after its implemented flag was set, ready to be
/// written to the kind-specific snapshot store.
#[derive(Debug)]
pub(crate) enum FlaggedMarker {
    Npc(NpcMarker),
    Item(ItemMarker),
    MapChange(MapChangeMarker),
    Quest(QuestMarker),
}

/// Looks up the marker with `marker_id` in the map collection matching
/// `kind`. Each kind reads only its own collection; ids never resolve across
/// kinds.
pub fn resolve_marker<'a>(
    map: &'a Map,
    marker_id: &str,
    kind: MarkerKind,
) -> Option<MarkerRef<'a>> {
    match kind {
        MarkerKind::Npc => map
            .npc_markers
            .iter()
            .find(|marker| marker.id == marker_id)
            .map(MarkerRef::Npc),
        MarkerKind::Item => map
            .item_markers
            .iter()
            .find(|marker| marker.id == marker_id)
            .map(MarkerRef::Item),
        MarkerKind::MapChange => map
            .map_change_markers
            .iter()
            .find(|marker| marker.id == marker_id)
            .map(MarkerRef::MapChange),
        MarkerKind::Quest => map
            .quest_markers
            .iter()
            .find(|marker| marker.id == marker_id)
            .map(MarkerRef::Quest),
    }
}

/// Sets the implemented flag on the matching marker in place and returns an
/// owned copy for snapshotting. Returns `None` when the map has no such
/// marker under that kind.
pub(crate) fn flag_marker(
    map: &mut Map,
    marker_id: &str,
    kind: MarkerKind,
) -> Option<FlaggedMarker> {
    match kind {
        MarkerKind::Npc => map
            .npc_markers
            .iter_mut()
            .find(|marker| marker.id == marker_id)
            .map(|marker| {
                marker.is_implemented = true;
                FlaggedMarker::Npc(marker.clone())
            }),
        MarkerKind::Item => map
            .item_markers
            .iter_mut()
            .find(|marker| marker.id == marker_id)
            .map(|marker| {
                marker.is_implemented = true;
                FlaggedMarker::Item(marker.clone())
            }),
        MarkerKind::MapChange => map
            .map_change_markers
            .iter_mut()
            .find(|marker| marker.id == marker_id)
            .map(|marker| {
                marker.is_implemented = true;
                FlaggedMarker::MapChange(marker.clone())
            }),
        MarkerKind::Quest => map
            .quest_markers
            .iter_mut()
            .find(|marker| marker.id == marker_id)
            .map(|marker| {
                marker.is_implemented = true;
                FlaggedMarker::Quest(marker.clone())
            }),
    }
}
