use super::types::{CompareResult, FieldDifference, FormattedDifference};

/// Display form of a full compare outcome, mirroring `CompareResult` with
/// formatted rows. Differences are only rendered when a snapshot exists.
#[derive(Debug, Clone)]
pub struct FormattedCompareResponse {
    pub snapshot_exists: bool,
    pub differences: Vec<FormattedDifference>,
}

pub fn format_compare_result(result: &CompareResult) -> FormattedCompareResponse {
    FormattedCompareResponse {
        snapshot_exists: result.snapshot_exists,
        differences: if result.snapshot_exists {
            format_differences(&result.differences)
        } else {
            Vec::new()
        },
    }
}

/// Pure transform from raw differences to display rows. Change kinds and
/// ordering pass through untouched; no comparison happens here.
pub fn format_differences(differences: &[FieldDifference]) -> Vec<FormattedDifference> {
    differences.iter().map(format_difference).collect()
}

fn format_difference(difference: &FieldDifference) -> FormattedDifference {
    FormattedDifference {
        label: label_for_field(&difference.field),
        kind: difference.kind,
        old_value: render_value(difference.old_value.as_deref()),
        new_value: render_value(difference.new_value.as_deref()),
    }
}

// Fixed-schema field paths get human labels; custom field names and node
// paths pass through verbatim since they are already author-facing.
fn label_for_field(field: &str) -> String {
    let label = match field {
        "name" => "Name",
        "description" => "Description",
        "is_main_quest" => "Main Quest",
        "related_character_id" => "Related Character",
        "npc_id" => "Referenced Npc",
        "item_id" => "Referenced Item",
        "target_map_id" => "Target Map",
        "quest_id" => "Referenced Quest",
        "x" => "Position X",
        "y" => "Position Y",
        _ => return field.to_string(),
    };
    label.to_string()
}

fn render_value(value: Option<&str>) -> String {
    match value {
        Some("") => "(empty)".to_string(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}
