use std::collections::HashMap;

use crate::model::{FieldKind, FlexField};

use super::types::FieldDifference;

/// Records a `Changed` difference when a fixed text field differs between
/// snapshot and live values. Equal values produce no entry.
pub(crate) fn compare_fixed_field(
    differences: &mut Vec<FieldDifference>,
    field: &str,
    old_value: &str,
    new_value: &str,
) {
    if old_value != new_value {
        differences.push(FieldDifference::changed(
            field.to_string(),
            old_value.to_string(),
            new_value.to_string(),
        ));
    }
}

pub(crate) fn compare_fixed_bool(
    differences: &mut Vec<FieldDifference>,
    field: &str,
    old_value: bool,
    new_value: bool,
) {
    if old_value != new_value {
        differences.push(FieldDifference::changed(
            field.to_string(),
            old_value.to_string(),
            new_value.to_string(),
        ));
    }
}

pub(crate) fn compare_fixed_f32(
    differences: &mut Vec<FieldDifference>,
    field: &str,
    old_value: f32,
    new_value: f32,
) {
    if old_value != new_value {
        differences.push(FieldDifference::changed(
            field.to_string(),
            old_value.to_string(),
            new_value.to_string(),
        ));
    }
}

/// Symmetric comparison of two flexible-field sequences, keyed by field name.
///
/// Names present only live are `Added`, names present only in the snapshot
/// are `Removed`, names present in both with differing values are `Changed`.
/// Output follows the live declaration order, with removed-only fields
/// appended after in snapshot order. A name appears at most once; if a side
/// declares a name twice, the first occurrence wins.
pub(crate) fn diff_flex_fields(
    live: &[FlexField],
    snapshot: &[FlexField],
) -> Vec<FieldDifference> {
    let mut snapshot_by_name = HashMap::<&str, &FlexField>::new();
    for field in snapshot {
        snapshot_by_name.entry(field.name.as_str()).or_insert(field);
    }

    let mut differences = Vec::new();
    let mut seen_live = Vec::<&str>::new();
    for field in live {
        if seen_live.contains(&field.name.as_str()) {
            continue;
        }
        seen_live.push(field.name.as_str());
        match snapshot_by_name.get(field.name.as_str()) {
            None => {
                differences.push(FieldDifference::added(
                    field.name.clone(),
                    field.value.clone(),
                ));
            }
            Some(snapshot_field) => {
                if !flex_values_equal(field, snapshot_field) {
                    differences.push(FieldDifference::changed(
                        field.name.clone(),
                        snapshot_field.value.clone(),
                        field.value.clone(),
                    ));
                }
            }
        }
    }

    let mut seen_removed = Vec::<&str>::new();
    for field in snapshot {
        if seen_live.contains(&field.name.as_str())
            || seen_removed.contains(&field.name.as_str())
        {
            continue;
        }
        seen_removed.push(field.name.as_str());
        differences.push(FieldDifference::removed(
            field.name.clone(),
            field.value.clone(),
        ));
    }

    differences
}

/// Value equality for flexible fields. Number fields compare numerically so
/// formatting differences ("10" vs "10.0") are not drift; unparseable
/// numbers and every other kind compare as text. A kind change is a change.
fn flex_values_equal(live: &FlexField, snapshot: &FlexField) -> bool {
    if live.kind != snapshot.kind {
        return false;
    }
    if live.kind == FieldKind::Number {
        if let (Ok(live_value), Ok(snapshot_value)) = (
            live.value.trim().parse::<f64>(),
            snapshot.value.trim().parse::<f64>(),
        ) {
            return live_value == snapshot_value;
        }
    }
    live.value == snapshot.value
}
