//! Condition group evaluation.
//!
//! Groups are OR'd together at the top level; conditions inside a group
//! combine with AND (`require_all`) or OR, short-circuiting in both cases.

use formrule_core::{ConditionGroup, FormDefinition, FormValues};

use crate::condition::evaluate_condition;

/// Decide whether a rule with these condition groups fires.
///
/// No groups at all means the rule is ungated and always fires.
pub fn evaluate_condition_groups(
    groups: &[ConditionGroup],
    form: &FormDefinition,
    values: &FormValues,
) -> bool {
    if groups.is_empty() {
        return true;
    }
    groups.iter().any(|group| evaluate_group(group, form, values))
}

/// Evaluate a single group.
///
/// Conditions testing a field that is not part of the form are skipped,
/// so an empty (or fully skipped) group yields its identity: `true` for
/// AND, `false` for OR.
pub fn evaluate_group(group: &ConditionGroup, form: &FormDefinition, values: &FormValues) -> bool {
    for condition in &group.conditions {
        let Some(field) = form.field(&condition.field_id) else {
            tracing::debug!(field = %condition.field_id, "condition tests unknown field; skipped");
            continue;
        };

        let current = values.get(&field.name);
        // A reference field that does not resolve leaves the literal in place.
        let compare = match condition.reference_field_id().and_then(|id| form.field(id)) {
            Some(reference) => values.get(&reference.name),
            None => Some(&condition.value),
        };

        let outcome = evaluate_condition(field.field_type, current, &condition.operator, compare);
        if group.require_all && !outcome {
            return false;
        }
        if !group.require_all && outcome {
            return true;
        }
    }
    group.require_all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormDefinition {
        FormDefinition::from_value(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [
                {"id": "age", "name": "Age", "type": "Number"},
                {"id": "min", "name": "MinAge", "type": "Number"},
                {"id": "country", "name": "Country", "type": "DropDown"}
            ]
        }))
        .unwrap()
    }

    fn values() -> FormValues {
        serde_json::from_value(serde_json::json!({
            "Age": 30, "MinAge": 21, "Country": "US"
        }))
        .unwrap()
    }

    fn group(require_all: bool, conditions: serde_json::Value) -> ConditionGroup {
        serde_json::from_value(serde_json::json!({
            "requireAll": require_all,
            "conditions": conditions
        }))
        .unwrap()
    }

    fn holds() -> serde_json::Value {
        serde_json::json!({"fieldId": "age", "operator": ">", "value": 18})
    }

    fn fails() -> serde_json::Value {
        serde_json::json!({"fieldId": "country", "operator": "==", "value": "CA"})
    }

    #[test]
    fn no_groups_always_fire() {
        assert!(evaluate_condition_groups(&[], &form(), &values()));
    }

    #[test]
    fn and_semantics() {
        let (f, v) = (form(), values());
        assert!(!evaluate_group(&group(true, serde_json::json!([holds(), fails()])), &f, &v));
        assert!(evaluate_group(&group(true, serde_json::json!([holds(), holds()])), &f, &v));
    }

    #[test]
    fn or_semantics() {
        let (f, v) = (form(), values());
        assert!(evaluate_group(&group(false, serde_json::json!([fails(), holds()])), &f, &v));
        assert!(!evaluate_group(&group(false, serde_json::json!([fails(), fails()])), &f, &v));
    }

    #[test]
    fn empty_group_yields_identity() {
        let (f, v) = (form(), values());
        assert!(evaluate_group(&group(true, serde_json::json!([])), &f, &v));
        assert!(!evaluate_group(&group(false, serde_json::json!([])), &f, &v));
    }

    #[test]
    fn unknown_condition_fields_are_skipped() {
        let (f, v) = (form(), values());
        let ghost = serde_json::json!({"fieldId": "ghost", "operator": "==", "value": 1});
        assert!(evaluate_group(&group(true, serde_json::json!([ghost.clone(), holds()])), &f, &v));
        assert!(!evaluate_group(&group(false, serde_json::json!([ghost, fails()])), &f, &v));
    }

    #[test]
    fn groups_are_ored() {
        let groups = vec![
            group(true, serde_json::json!([fails()])),
            group(true, serde_json::json!([holds()])),
        ];
        assert!(evaluate_condition_groups(&groups, &form(), &values()));
        let groups = vec![group(true, serde_json::json!([fails()]))];
        assert!(!evaluate_condition_groups(&groups, &form(), &values()));
    }

    #[test]
    fn reference_field_supersedes_literal() {
        let (f, mut v) = (form(), values());
        let cond = serde_json::json!([
            {"fieldId": "age", "operator": ">=", "value": 99, "valueFieldId": "min"}
        ]);
        assert!(evaluate_group(&group(true, cond.clone()), &f, &v));
        v.set("MinAge", 31i64);
        assert!(!evaluate_group(&group(true, cond), &f, &v));
    }

    #[test]
    fn unresolved_reference_keeps_literal() {
        let (f, v) = (form(), values());
        let cond = serde_json::json!([
            {"fieldId": "age", "operator": "==", "value": 30, "valueFieldId": "ghost"}
        ]);
        assert!(evaluate_group(&group(true, cond), &f, &v));
    }
}
