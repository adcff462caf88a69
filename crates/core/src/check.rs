//! Authoring checks for form definitions.
//!
//! The engine tolerates every inconsistency reported here at runtime (a
//! dangling reference just means a rule or condition is skipped). These
//! checks exist so an author can find such problems before a form ships.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::form::{FieldType, FormDefinition};
use crate::rule::ActionKind;

/// Kinds of authoring inconsistencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateFieldId,
    DuplicateFieldName,
    MissingRuleTarget,
    MissingConditionField,
    MissingReferenceField,
    MissingDataSource,
    UnknownDataSourceParameter,
    InvalidRegex,
    MissingCascadeParent,
    LengthBoundsInverted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionIssue {
    pub kind: IssueKind,
    pub field_id: String,
    pub message: String,
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field_id, self.message)
    }
}

/// Report every authoring inconsistency in `form`, in field order.
pub fn check_definition(form: &FormDefinition) -> Vec<DefinitionIssue> {
    let mut issues = Vec::new();
    let mut push = |kind, field_id: &str, message: String| {
        issues.push(DefinitionIssue {
            kind,
            field_id: field_id.to_string(),
            message,
        })
    };

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let field_names: HashSet<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();

    for field in &form.fields {
        if !seen_ids.insert(field.id.as_str()) {
            push(
                IssueKind::DuplicateFieldId,
                &field.id,
                format!("field id '{}' is declared more than once", field.id),
            );
        }
        if !seen_names.insert(field.name.as_str()) {
            push(
                IssueKind::DuplicateFieldName,
                &field.id,
                format!("field name '{}' is declared more than once", field.name),
            );
        }

        if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
            if min > max {
                push(
                    IssueKind::LengthBoundsInverted,
                    &field.id,
                    format!("minLength {} exceeds maxLength {}", min, max),
                );
            }
        }

        if let Some(pattern) = &field.regex_pattern {
            if let Err(e) = Regex::new(pattern) {
                push(
                    IssueKind::InvalidRegex,
                    &field.id,
                    format!("regex pattern '{}' does not compile: {}", pattern, e),
                );
            }
        }

        if field.field_type == FieldType::CascadingDropDown {
            match field.parent_field_id.as_deref() {
                Some(parent) if form.field(parent).is_some() => {}
                Some(parent) => push(
                    IssueKind::MissingCascadeParent,
                    &field.id,
                    format!("cascade parent '{}' is not a field of this form", parent),
                ),
                None => push(
                    IssueKind::MissingCascadeParent,
                    &field.id,
                    "cascading dropdown declares no parent field".to_string(),
                ),
            }
        }

        for rule in &field.rules {
            let target = rule.target(&field.id);
            if form.field(target).is_none() {
                push(
                    IssueKind::MissingRuleTarget,
                    &field.id,
                    format!("rule '{}' targets unknown field '{}'", rule.id, target),
                );
            }

            for condition in rule.condition_groups.iter().flat_map(|g| &g.conditions) {
                if form.field(&condition.field_id).is_none() {
                    push(
                        IssueKind::MissingConditionField,
                        &field.id,
                        format!(
                            "rule '{}' tests unknown field '{}'",
                            rule.id, condition.field_id
                        ),
                    );
                }
                if let Some(reference) = condition.reference_field_id() {
                    if form.field(reference).is_none() {
                        push(
                            IssueKind::MissingReferenceField,
                            &field.id,
                            format!(
                                "rule '{}' compares against unknown field '{}'",
                                rule.id, reference
                            ),
                        );
                    }
                }
            }

            for action in rule.actions.iter().filter(|a| a.kind == ActionKind::LoadOptions) {
                let Some(source) = &action.data_source else {
                    push(
                        IssueKind::MissingDataSource,
                        &field.id,
                        format!("rule '{}' loads options without a data source", rule.id),
                    );
                    continue;
                };
                for (placeholder, source_field) in &source.parameters {
                    if !field_names.contains(source_field.as_str()) {
                        push(
                            IssueKind::UnknownDataSourceParameter,
                            &field.id,
                            format!(
                                "placeholder '{{{}}}' reads unknown field '{}'",
                                placeholder, source_field
                            ),
                        );
                    }
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(form: serde_json::Value) -> Vec<IssueKind> {
        let form = FormDefinition::from_value(form).unwrap();
        check_definition(&form).into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn clean_form_has_no_issues() {
        let issues = kinds(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [
                {"id": "a", "name": "A", "type": "Number"},
                {"id": "b", "name": "B", "rules": [{
                    "conditionGroups": [{"conditions": [
                        {"fieldId": "a", "operator": ">", "value": 1}
                    ]}],
                    "actions": [{"type": "hide"}]
                }]}
            ]
        }));
        assert!(issues.is_empty());
    }

    #[test]
    fn duplicates_and_dangling_references() {
        let issues = kinds(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [
                {"id": "a", "name": "A"},
                {"id": "a", "name": "A", "rules": [{
                    "id": "r1",
                    "targetFieldId": "ghost",
                    "conditionGroups": [{"conditions": [
                        {"fieldId": "nope", "operator": "==", "valueFieldId": "gone"}
                    ]}],
                    "actions": [{"type": "loadOptions"}]
                }]}
            ]
        }));
        assert_eq!(
            issues,
            vec![
                IssueKind::DuplicateFieldId,
                IssueKind::DuplicateFieldName,
                IssueKind::MissingRuleTarget,
                IssueKind::MissingConditionField,
                IssueKind::MissingReferenceField,
                IssueKind::MissingDataSource,
            ]
        );
    }

    #[test]
    fn field_constraint_problems() {
        let issues = kinds(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [
                {"id": "a", "name": "A", "minLength": 5, "maxLength": 2, "regexPattern": "(["},
                {"id": "c", "name": "C", "type": "CascadingDropDown", "parentFieldId": "x"},
                {"id": "d", "name": "D", "rules": [{"actions": [{
                    "type": "loadOptions",
                    "dataSource": {
                        "url": "http://x/{country}",
                        "parameters": {"country": "Country"},
                        "valueField": "code", "textField": "name"
                    }
                }]}]}
            ]
        }));
        assert_eq!(
            issues,
            vec![
                IssueKind::LengthBoundsInverted,
                IssueKind::InvalidRegex,
                IssueKind::MissingCascadeParent,
                IssueKind::UnknownDataSourceParameter,
            ]
        );
    }
}
