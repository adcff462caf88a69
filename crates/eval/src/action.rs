//! Action application and revert.
//!
//! The only place the engine mutates a form or its value mapping. Every
//! action kind is applied to the rule's resolved target field; a target
//! that has disappeared (e.g. removed earlier in the pass) makes the action
//! a no-op.

use formrule_core::{
    ActionKind, FieldAction, FieldRule, FormDefinition, FormField, FormValues, ValidationRule,
    Value,
};

use crate::loader::{LoaderError, OptionLoader};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("Failed to load options: {source}")]
    OptionLoad {
        field_id: String,
        source: LoaderError,
    },
}

impl ActionError {
    /// Field the failed action targeted.
    pub fn field_id(&self) -> &str {
        match self {
            ActionError::OptionLoad { field_id, .. } => field_id,
        }
    }
}

/// Apply one action of a fired rule to the field `target_id`.
///
/// Only `loadOptions` can fail; a failed load leaves the field's options
/// and value untouched.
pub async fn apply_action(
    action: &FieldAction,
    form: &mut FormDefinition,
    values: &mut FormValues,
    target_id: &str,
    rule: &FieldRule,
    loader: &dyn OptionLoader,
) -> Result<(), ActionError> {
    match &action.kind {
        ActionKind::Show => with_field(form, target_id, |f| f.hidden = false),
        ActionKind::Hide => with_field(form, target_id, |f| f.hidden = true),
        ActionKind::Enable => with_field(form, target_id, |f| f.readonly = false),
        ActionKind::Disable => with_field(form, target_id, |f| f.readonly = true),

        ActionKind::SetValue => {
            let value = action.value.clone().map(Value::from).unwrap_or_default();
            with_field(form, target_id, |f| {
                values.set(f.name.clone(), value);
                f.system_controlled = true;
                f.system_set_reason = Some(rule.description.clone());
            });
        }

        ActionKind::SetRequired => {
            let raw = action.value.clone().map(Value::from).unwrap_or_default();
            match raw.to_bool() {
                Ok(required) => with_field(form, target_id, |f| f.required = required),
                Err(e) => {
                    tracing::debug!(rule = %rule.id, error = %e, "setRequired value is not a boolean; ignored")
                }
            }
        }

        ActionKind::LoadOptions => {
            let Some(source) = &action.data_source else {
                tracing::debug!(rule = %rule.id, "loadOptions without a data source; ignored");
                return Ok(());
            };
            if form.field(target_id).is_none() {
                return Ok(());
            }
            let options = loader
                .load(source, values)
                .await
                .map_err(|source| ActionError::OptionLoad {
                    field_id: target_id.to_string(),
                    source,
                })?;
            with_field(form, target_id, |f| {
                f.options = options;
                values.set(f.name.clone(), Value::Null);
            });
        }

        ActionKind::AddValidation => {
            let condition = action
                .value
                .clone()
                .map(Value::from)
                .filter(|v| !v.is_null())
                .map(|v| v.to_text());
            with_field(form, target_id, |f| {
                f.custom_validations.push(ValidationRule {
                    message: action.message.clone(),
                    condition,
                })
            });
        }

        ActionKind::RemoveField => {
            form.remove_field(target_id);
        }

        ActionKind::AddField => {
            let Some(doc) = action.value.clone() else {
                return Ok(());
            };
            match serde_json::from_value::<FormField>(doc) {
                Ok(field) => {
                    let id = field.id.clone();
                    if !form.add_field(field) {
                        tracing::debug!(rule = %rule.id, field = %id, "addField with an existing id; ignored");
                    }
                }
                Err(e) => {
                    tracing::debug!(rule = %rule.id, error = %e, "addField value is not a field definition; ignored")
                }
            }
        }

        ActionKind::Other(kind) => {
            tracing::debug!(rule = %rule.id, kind = %kind, "unrecognized action type; ignored");
        }
    }
    Ok(())
}

/// Restore the field's baseline flags and, when a rule had set its value,
/// the baseline value.
pub fn revert_field(form: &mut FormDefinition, values: &mut FormValues, target_id: &str) {
    with_field(form, target_id, |f| {
        if let Some(value) = f.revert_to_baseline() {
            values.set(f.name.clone(), value);
        }
    });
}

fn with_field(form: &mut FormDefinition, id: &str, apply: impl FnOnce(&mut FormField)) {
    if let Some(field) = form.field_mut(id) {
        apply(field);
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
