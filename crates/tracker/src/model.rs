use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag for a flexible field value. `Number` values compare numerically,
/// everything else compares as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Option,
}

/// A user-defined field attached to an entity in addition to its fixed schema.
/// The sequence order on an entity is the authoring declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexField {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
}

impl FlexField {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text,
            value: value.to_string(),
        }
    }

    pub fn number(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Number,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub fields: Vec<FlexField>,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub fields: Vec<FlexField>,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_main_quest: bool,
    pub fields: Vec<FlexField>,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNode {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialog {
    pub id: String,
    pub related_character_id: String,
    pub nodes: Vec<DialogNode>,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcMarker {
    pub id: String,
    pub npc_id: String,
    pub x: f32,
    pub y: f32,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMarker {
    pub id: String,
    pub item_id: String,
    pub x: f32,
    pub y: f32,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapChangeMarker {
    pub id: String,
    pub target_map_id: String,
    pub x: f32,
    pub y: f32,
    pub is_implemented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestMarker {
    pub id: String,
    pub quest_id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub is_implemented: bool,
}

/// A map owns its markers; markers have no identity outside their parent map
/// and are persisted only through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    pub id: String,
    pub name: String,
    pub npc_markers: Vec<NpcMarker>,
    pub item_markers: Vec<ItemMarker>,
    pub map_change_markers: Vec<MapChangeMarker>,
    pub quest_markers: Vec<QuestMarker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Character,
    Item,
    Dialog,
    Quest,
}

impl EntityKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "character" => Some(Self::Character),
            "item" => Some(Self::Item),
            "dialog" => Some(Self::Dialog),
            "quest" => Some(Self::Quest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Item => "item",
            Self::Dialog => "dialog",
            Self::Quest => "quest",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Npc,
    Item,
    MapChange,
    Quest,
}

impl MarkerKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "npc" => Some(Self::Npc),
            "item" => Some(Self::Item),
            "map_change" => Some(Self::MapChange),
            "quest" => Some(Self::Quest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Item => "item",
            Self::MapChange => "map_change",
            Self::Quest => "quest",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything addressable by a stable string id in a store.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(
    Character,
    Item,
    Quest,
    Dialog,
    Map,
    NpcMarker,
    ItemMarker,
    MapChangeMarker,
    QuestMarker,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_round_trips_through_strings() {
        for kind in [
            EntityKind::Character,
            EntityKind::Item,
            EntityKind::Dialog,
            EntityKind::Quest,
        ] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("marker"), None);
    }

    #[test]
    fn marker_kind_round_trips_through_strings() {
        for kind in [
            MarkerKind::Npc,
            MarkerKind::Item,
            MarkerKind::MapChange,
            MarkerKind::Quest,
        ] {
            assert_eq!(MarkerKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MarkerKind::parse("mapchange"), None);
    }
}
