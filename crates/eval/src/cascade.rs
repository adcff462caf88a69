//! Cascading dropdown refresh.
//!
//! A cascading field picks its options from `cascading_options` keyed by
//! the parent field's current value. Changing a parent refreshes its
//! children, and a child whose value is cleared refreshes its own children
//! in turn.

use std::collections::HashSet;

use formrule_core::{FormDefinition, FormValues, OptionItem, Value};

/// Recompute the option list of every cascading descendant of
/// `parent_field_id`. Returns the ids of the fields whose options were
/// recomputed, in the order they were visited.
pub fn refresh_cascading_options(
    form: &mut FormDefinition,
    values: &mut FormValues,
    parent_field_id: &str,
) -> Vec<String> {
    let mut refreshed = Vec::new();
    let mut seen = HashSet::new();
    let mut worklist = vec![parent_field_id.to_string()];

    while let Some(parent_id) = worklist.pop() {
        if !seen.insert(parent_id.clone()) {
            continue;
        }
        let Some(parent) = form.field(&parent_id) else {
            continue;
        };
        let parent_value = values
            .get(&parent.name)
            .map(Value::to_text)
            .unwrap_or_default();

        let children: Vec<String> = form
            .fields
            .iter()
            .filter(|f| f.parent_field_id.as_deref() == Some(parent_id.as_str()))
            .map(|f| f.id.clone())
            .collect();

        for child_id in children {
            let Some(child) = form.field_mut(&child_id) else {
                continue;
            };
            child.options = options_for(&child.cascading_options, &parent_value);

            let current = values.get(&child.name).map(Value::to_text).unwrap_or_default();
            if !current.is_empty() && !child.offers(&current) {
                tracing::debug!(field = %child_id, value = %current, "value no longer offered; cleared");
                values.set(child.name.clone(), Value::Null);
            }
            refreshed.push(child_id.clone());
            worklist.push(child_id);
        }
    }
    refreshed
}

/// Options for a parent value: exact key first, then case-insensitive.
fn options_for(
    table: &std::collections::BTreeMap<String, Vec<OptionItem>>,
    parent_value: &str,
) -> Vec<OptionItem> {
    if parent_value.is_empty() {
        return Vec::new();
    }
    table
        .get(parent_value)
        .or_else(|| {
            table
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(parent_value))
                .map(|(_, options)| options)
        })
        .cloned()
        .unwrap_or_default()
}
